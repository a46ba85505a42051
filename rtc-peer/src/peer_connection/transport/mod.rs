//! Transports carry the media sections of a connection over one ICE and one
//! DTLS sub-transport each.
//!
//! Both kinds of transport share the lifecycle implemented here:
//!
//! * [`transport_init_dtls`] creates the sub-transports and routes their
//!   notifications into the transport's own event channel,
//! * [`transport_handle_event`] is the per-transport loop forwarding those
//!   events to the connection and advancing the cascade: ICE connected starts
//!   DTLS, DTLS connected opens the secure session.
//!
//! What differs between [`MediaTransport`] and [`ApplicationTransport`] is only
//! the secure session they open once DTLS is connected.

pub mod application;
pub mod dtls;
pub mod ice;
pub mod media;
pub mod sctp;
pub mod state;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use sdp::description::media::MediaDescription;
use tokio::sync::{Mutex, mpsc};

use crate::peer_connection::PeerConnectionInternal;
use crate::peer_connection::event::RTCEventInternal;
use crate::peer_connection::sdp::get_by_mid;
pub use application::ApplicationTransport;
use dtls::parameters::{DTLSParameters, resolve_dtls_parameters};
use dtls::role::{RTCDtlsRole, resolve_local_dtls_role};
use dtls::state::RTCDtlsTransportState;
use dtls::RTCDtlsTransport;
use ice::candidate::RTCIceCandidate;
use ice::gatherer_state::RTCIceGathererState;
use ice::parameters::RTCIceParameters;
use ice::role::RTCIceRole;
use ice::state::RTCIceTransportState;
use ice::{RTCIceGatherOptions, RTCIceTransport};
pub use media::MediaTransport;
use shared::error::{Error, Result};
use state::TransportState;

/// Every transport takes the controlling ICE role.
pub(crate) const ICE_ROLE: RTCIceRole = RTCIceRole::Controlling;

pub type OnTransportStateChangeHdlrFn = Box<
    dyn (FnMut(TransportState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

/// TransportId identifies a transport within its connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransportId(pub(crate) u64);

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport-{}", self.0)
    }
}

/// The state every transport kind shares.
pub struct TransportCore {
    id: TransportId,
    pc: Weak<PeerConnectionInternal>,

    dtls_role: AtomicU8,
    state: AtomicU8,
    dtls_transport: OnceLock<Arc<dyn RTCDtlsTransport>>,

    events_tx: mpsc::Sender<RTCEventInternal>,

    /// set when DTLS was started, cleared on disconnect
    dtls_started: AtomicBool,
    closed: AtomicBool,

    on_state_change_handler: Arc<Mutex<Option<OnTransportStateChangeHdlrFn>>>,
}

impl TransportCore {
    pub(crate) fn new(
        id: TransportId,
        pc: Weak<PeerConnectionInternal>,
        events_tx: mpsc::Sender<RTCEventInternal>,
    ) -> Self {
        TransportCore {
            id,
            pc,
            dtls_role: AtomicU8::new(RTCDtlsRole::Auto as u8),
            state: AtomicU8::new(TransportState::Unspecified as u8),
            dtls_transport: OnceLock::new(),
            events_tx,
            dtls_started: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            on_state_change_handler: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn peer_connection(&self) -> Result<Arc<PeerConnectionInternal>> {
        self.pc.upgrade().ok_or(Error::ErrConnectionClosed)
    }

    pub(crate) fn dtls_transport(&self) -> Result<Arc<dyn RTCDtlsTransport>> {
        self.dtls_transport
            .get()
            .cloned()
            .ok_or(Error::ErrTransportNotInitialized)
    }

    /// Moves the transport to `state`, notifying the state change handler and
    /// the connection. Setting the current state again does nothing.
    pub(crate) async fn set_state(&self, state: TransportState) {
        let prev: TransportState = self.state.swap(state as u8, Ordering::SeqCst).into();
        if prev == state {
            return;
        }

        log::debug!("{} state changed: {} -> {}", self.id, prev, state);
        {
            let mut handler = self.on_state_change_handler.lock().await;
            if let Some(f) = &mut *handler {
                f(state).await;
            }
        }

        self.forward(RTCEventInternal::TransportEvent {
            transport_id: self.id,
            state,
        })
        .await;
    }

    /// Hands an event over to the dispatch loop of the connection.
    pub(crate) async fn forward(&self, event: RTCEventInternal) {
        match self.pc.upgrade() {
            Some(pc) => {
                if let Err(err) = pc.events_tx.send(event).await {
                    log::debug!("{}: connection loop is gone, dropping {}", self.id, err.0);
                }
            }
            None => log::debug!("{}: connection is gone, dropping {}", self.id, event),
        }
    }

    /// Ends the transport loop.
    pub(crate) async fn terminate(&self) {
        if self
            .events_tx
            .send(RTCEventInternal::TerminationEvent)
            .await
            .is_err()
        {
            log::debug!("{}: transport loop already ended", self.id);
        }
    }
}

/// Transport is the capability shared by media and application transports.
///
/// Implementors provide their core state, the mids they carry and the secure
/// session they open once DTLS is connected; the connection lifecycle is
/// provided on top of those.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    fn core(&self) -> &TransportCore;

    /// get_mids returns the mids carried by this transport, in order.
    async fn get_mids(&self) -> Vec<String>;

    /// Opens the secure session over a connected DTLS transport.
    async fn start_secure_session(&self) -> Result<()>;

    /// Closes the secure session before DTLS is stopped.
    async fn stop_secure_session(&self) -> Result<()>;

    fn id(&self) -> TransportId {
        self.core().id
    }

    fn state(&self) -> TransportState {
        self.core().state.load(Ordering::SeqCst).into()
    }

    fn get_dtls_role(&self) -> RTCDtlsRole {
        self.core().dtls_role.load(Ordering::SeqCst).into()
    }

    fn set_dtls_role(&self, role: RTCDtlsRole) {
        self.core().dtls_role.store(role as u8, Ordering::SeqCst);
    }

    fn dtls_transport(&self) -> Result<Arc<dyn RTCDtlsTransport>> {
        self.core().dtls_transport()
    }

    fn ice_transport(&self) -> Result<Arc<dyn RTCIceTransport>> {
        Ok(self.core().dtls_transport()?.ice_transport())
    }

    /// The mid the transport was negotiated for, the first one it carries.
    async fn local_mid(&self) -> Option<String> {
        self.get_mids().await.into_iter().next()
    }

    /// The media section of the current local description for this transport.
    async fn local_media_description(&self) -> Option<MediaDescription> {
        let mid = self.local_mid().await?;
        let pc = self.core().peer_connection().ok()?;
        let descriptions = pc.descriptions.lock().await;
        get_by_mid(&mid, descriptions.local_session()?).cloned()
    }

    /// The media section of the current remote description for this transport.
    async fn remote_media_description(&self) -> Option<MediaDescription> {
        let mid = self.local_mid().await?;
        let pc = self.core().peer_connection().ok()?;
        let descriptions = pc.descriptions.lock().await;
        get_by_mid(&mid, descriptions.remote_session()?).cloned()
    }

    /// connect starts ICE connectivity checks against the remote candidates.
    /// It does not wait for them; progress is reported through state events,
    /// failures are only logged.
    async fn connect(&self) {
        let core = self.core();
        let ice_transport = match self.ice_transport() {
            Ok(ice_transport) => ice_transport,
            Err(err) => {
                log::error!("{}: can't connect: {}", core.id, err);
                return;
            }
        };

        let remote_media = self.remote_media_description().await;
        let pc = match core.peer_connection() {
            Ok(pc) => pc,
            Err(err) => {
                log::error!("{}: can't connect: {}", core.id, err);
                return;
            }
        };
        let params = {
            let descriptions = pc.descriptions.lock().await;
            match descriptions.remote_session() {
                Some(session) => RTCIceParameters::from_description(remote_media.as_ref(), session),
                None => Err(Error::ErrNoRemoteDescription),
            }
        };
        let params = match params {
            Ok(params) => params,
            Err(err) => {
                log::error!("{}: failed to resolve remote ICE parameters: {}", core.id, err);
                return;
            }
        };

        core.set_state(TransportState::Connecting).await;

        log::debug!("{}: starting ICE connection", core.id);
        let id = core.id;
        let timeout = pc.setting_engine.timeout.ice_connect;
        tokio::spawn(async move {
            if let Err(err) = with_timeout(timeout, ice_transport.start(params, ICE_ROLE)).await {
                log::warn!("{id}: failed to start ICE connection: {err}");
            }
        });
    }

    /// disconnect stops the DTLS sub-transport and ends the transport loop.
    /// Calling it again does nothing.
    async fn disconnect(&self) {
        let core = self.core();
        if core.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Err(err) = self.stop_secure_session().await {
            log::warn!("{}: failed to stop secure session: {}", core.id, err);
        }
        match core.dtls_transport() {
            Ok(dtls_transport) => {
                if let Err(err) = dtls_transport.stop().await {
                    log::warn!("{}: failed to stop DTLS transport: {}", core.id, err);
                }
            }
            Err(err) => log::debug!("{}: nothing to stop: {}", core.id, err),
        }
        core.dtls_started.store(false, Ordering::SeqCst);

        core.set_state(TransportState::Closed).await;
        core.terminate().await;
    }

    /// add_ice_candidate hands a remote candidate to the ICE sub-transport.
    /// Candidates for another mid are skipped.
    async fn add_ice_candidate(&self, mid: &str, candidate: Option<RTCIceCandidate>) -> Result<()> {
        let local_mid = self.local_mid().await;
        if local_mid.as_deref() != Some(mid) {
            log::debug!(
                "{}: skipping ICE candidate for mid={} as we're only working with mid={:?}",
                self.id(),
                mid,
                local_mid
            );
            return Ok(());
        }

        self.ice_transport()?.add_remote_candidate(candidate).await
    }

    /// gather_ice_candidates starts gathering in the background.
    fn gather_ice_candidates(&self) {
        let id = self.id();
        let gatherer = match self.ice_transport() {
            Ok(ice_transport) => ice_transport.gatherer(),
            Err(err) => {
                log::error!("{id}: can't gather: {err}");
                return;
            }
        };

        log::debug!("{id}: starting ICE gathering");
        tokio::spawn(async move {
            if let Err(err) = gatherer.gather().await {
                log::warn!("{id}: failed to gather ICE candidates: {err}");
            }
        });
    }

    /// on_state_change sets a handler called when the transport state changes.
    async fn on_state_change(&self, f: OnTransportStateChangeHdlrFn) {
        *self.core().on_state_change_handler.lock().await = Some(f);
    }
}

/// RTCTransport is a transport of either kind.
#[derive(Clone)]
pub enum RTCTransport {
    Media(Arc<MediaTransport>),
    Application(Arc<ApplicationTransport>),
}

impl RTCTransport {
    pub fn as_transport(&self) -> &dyn Transport {
        match self {
            RTCTransport::Media(t) => t.as_ref(),
            RTCTransport::Application(t) => t.as_ref(),
        }
    }

    pub fn id(&self) -> TransportId {
        self.as_transport().id()
    }

    pub fn state(&self) -> TransportState {
        self.as_transport().state()
    }

    pub async fn get_mids(&self) -> Vec<String> {
        self.as_transport().get_mids().await
    }

    pub async fn connect(&self) {
        self.as_transport().connect().await
    }

    pub async fn disconnect(&self) {
        self.as_transport().disconnect().await
    }

    pub async fn add_ice_candidate(
        &self,
        mid: &str,
        candidate: Option<RTCIceCandidate>,
    ) -> Result<()> {
        self.as_transport().add_ice_candidate(mid, candidate).await
    }

    pub fn gather_ice_candidates(&self) {
        self.as_transport().gather_ice_candidates()
    }
}

pub(crate) async fn with_timeout<F>(timeout: Option<Duration>, f: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, f)
            .await
            .unwrap_or(Err(Error::ErrTimeout)),
        None => f.await,
    }
}

async fn send_event(tx: &mpsc::Sender<RTCEventInternal>, event: RTCEventInternal) {
    if let Err(err) = tx.send(event).await {
        log::debug!("transport loop is gone, dropping {}", err.0);
    }
}

/// transport_init_dtls creates the ICE gatherer, ICE transport and DTLS
/// transport of `t` and routes their notifications into its event channel.
///
/// On failure the transport is left without a DTLS transport.
pub(crate) async fn transport_init_dtls<T: Transport + ?Sized>(t: &T) -> Result<()> {
    let core = t.core();
    let pc = core.peer_connection()?;

    let gatherer = pc
        .backend
        .new_ice_gatherer(RTCIceGatherOptions {
            ice_servers: pc.configuration.get_ice_servers(),
            ice_gather_policy: pc.configuration.ice_transport_policy,
            local_parameters: RTCIceParameters::generate(),
        })
        .inspect_err(|err| log::error!("{}: failed to create ICE gatherer: {}", core.id, err))?;

    let ice_transport = pc.backend.new_ice_transport(Arc::clone(&gatherer));
    let dtls_transport = pc
        .backend
        .new_dtls_transport(Arc::clone(&ice_transport), pc.configuration.certificates.clone())
        .inspect_err(|err| log::error!("{}: failed to create DTLS transport: {}", core.id, err))?;

    let id = core.id;

    let tx = core.events_tx.clone();
    gatherer.on_local_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
        let tx = tx.clone();
        Box::pin(async move {
            send_event(
                &tx,
                RTCEventInternal::IceCandidateEvent {
                    transport_id: id,
                    candidate,
                },
            )
            .await;
        })
    }));

    let tx = core.events_tx.clone();
    gatherer.on_state_change(Box::new(move |state: RTCIceGathererState| {
        let tx = tx.clone();
        Box::pin(async move {
            if let Some(state) = state.to_gathering_state() {
                send_event(
                    &tx,
                    RTCEventInternal::IceGatheringEvent {
                        transport_id: id,
                        state,
                    },
                )
                .await;
            }
        })
    }));

    let tx = core.events_tx.clone();
    ice_transport.on_connection_state_change(Box::new(move |state: RTCIceTransportState| {
        let tx = tx.clone();
        Box::pin(async move {
            send_event(
                &tx,
                RTCEventInternal::IceStateEvent {
                    transport_id: id,
                    state,
                },
            )
            .await;
        })
    }));

    let tx = core.events_tx.clone();
    dtls_transport.on_state_change(Box::new(move |state: RTCDtlsTransportState| {
        let tx = tx.clone();
        Box::pin(async move {
            send_event(
                &tx,
                RTCEventInternal::DtlsStateEvent {
                    transport_id: id,
                    state,
                },
            )
            .await;
        })
    }));

    if core.dtls_transport.set(dtls_transport).is_err() {
        log::warn!("{id}: DTLS transport was already initialized");
    }

    Ok(())
}

/// transport_handle_event runs the loop of one transport until it is
/// terminated. Sub-transport events are forwarded to the connection; ICE and
/// DTLS reaching connected advance the cascade first.
pub(crate) async fn transport_handle_event<T: Transport>(
    transport: Arc<T>,
    mut events_rx: mpsc::Receiver<RTCEventInternal>,
) {
    let core = transport.core();
    log::debug!("{}: event loop started", core.id);

    while let Some(event) = events_rx.recv().await {
        match event {
            RTCEventInternal::IceStateEvent { state, .. } => {
                if state == RTCIceTransportState::Connected {
                    transport_ice_connected(transport.as_ref()).await;
                }
                core.forward(event).await;
            }
            RTCEventInternal::DtlsStateEvent { state, .. } => {
                core.forward(event).await;
                if state == RTCDtlsTransportState::Connected {
                    transport_dtls_connected(transport.as_ref()).await;
                }
            }
            RTCEventInternal::IceGatheringEvent { .. }
            | RTCEventInternal::IceCandidateEvent { .. } => core.forward(event).await,
            RTCEventInternal::TerminationEvent => break,
            RTCEventInternal::SignalingStateEvent(_)
            | RTCEventInternal::ConnectionStateEvent(_)
            | RTCEventInternal::TransportEvent { .. } => {
                log::warn!("{}: ignoring unexpected {}", core.id, event);
            }
        }
    }

    log::debug!("{}: event loop terminated", core.id);
}

/// transport_ice_connected starts the DTLS handshake, once per connection of
/// the transport.
pub(crate) async fn transport_ice_connected<T: Transport + ?Sized>(t: &T) {
    let core = t.core();
    if core.dtls_started.swap(true, Ordering::SeqCst) {
        log::debug!("{}: DTLS already started, ignoring ICE connected", core.id);
        return;
    }

    log::debug!("{}: ICE transport connected - engaging DTLS", core.id);

    let started = async {
        let params = transport_get_dtls_params(t).await?;
        let dtls_transport = core.dtls_transport()?;
        let timeout = core.peer_connection()?.setting_engine.timeout.dtls_handshake;
        Ok::<_, Error>((params, dtls_transport, timeout))
    };
    let (params, dtls_transport, timeout) = match started.await {
        Ok(started) => started,
        Err(err) => {
            log::error!("{}: failed to extract DTLS params from SDP: {}", core.id, err);
            core.dtls_started.store(false, Ordering::SeqCst);
            return;
        }
    };

    log::debug!(
        "{}: DTLS params: role={}, fingerprints={:?}",
        core.id,
        params.role,
        params.fingerprints
    );

    let id = core.id;
    tokio::spawn(async move {
        if let Err(err) = with_timeout(timeout, dtls_transport.start(params)).await {
            log::error!("{id}: DTLS start failed: {err}");
        }
    });
}

async fn transport_dtls_connected<T: Transport + ?Sized>(t: &T) {
    let core = t.core();
    log::debug!("{}: DTLS transport connected, starting secure session", core.id);

    match t.start_secure_session().await {
        Ok(()) => core.set_state(TransportState::Connected).await,
        Err(err) => log::error!("{}: failed to start secure session: {}", core.id, err),
    }
}

/// transport_get_dtls_params resolves the parameters the handshake of `t`
/// starts with: the remote fingerprints of its media section and the local role,
/// which is never Auto.
pub(crate) async fn transport_get_dtls_params<T: Transport + ?Sized>(
    t: &T,
) -> Result<DTLSParameters> {
    let remote_media = t.remote_media_description().await;
    let pc = t.core().peer_connection()?;
    let descriptions = pc.descriptions.lock().await;
    let session = descriptions
        .remote_session()
        .ok_or(Error::ErrNoRemoteDescription)?;

    let remote = resolve_dtls_parameters(remote_media.as_ref(), session)?;
    Ok(DTLSParameters {
        role: resolve_local_dtls_role(t.get_dtls_role(), remote.role, ICE_ROLE),
        fingerprints: remote.fingerprints,
    })
}
