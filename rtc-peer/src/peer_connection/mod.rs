pub mod certificate;
pub mod configuration;
pub(crate) mod event;
pub mod sdp;
pub mod state;
pub mod transport;

mod cascade;
mod dispatch;
mod notifier;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use ::sdp::description::session::SessionDescription;
use tokio::sync::{Mutex, mpsc};

use crate::api::{API, TransportBackend};
use crate::media_stream::track_remote::TrackRemote;
use crate::rtp_transceiver::direction::RTCRtpTransceiverDirection;
use crate::rtp_transceiver::rtp_codec::RtpCodecKind;
use crate::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use crate::rtp_transceiver::rtp_sender::RTCRtpSender;
use crate::rtp_transceiver::{DeclaredNegotiation, RTCRtpTransceiver};
use certificate::RTCCertificate;
use configuration::RTCConfiguration;
use configuration::media_engine::MediaEngine;
use configuration::setting_engine::SettingEngine;
use dispatch::EventDispatcher;
use event::RTCEventInternal;
use notifier::{Notification, run_notifier};
use self::sdp::{RTCSdpType, RTCSessionDescription};
use shared::error::{Error, Result};
use state::ice_connection_state::RTCIceConnectionState;
use state::ice_gathering_state::RTCIceGatheringState;
use state::peer_connection_state::RTCPeerConnectionState;
use state::signaling_state::{
    RTCSignalingState, StateChangeOp, check_next_signaling_state, signaling_state_after,
};
use transport::dtls::role::negotiate_dtls_role;
use transport::ice::OnLocalCandidateHdlrFn;
use transport::ice::candidate::RTCIceCandidate;
use transport::state::TransportState;
use transport::{
    ApplicationTransport, MediaTransport, RTCTransport, Transport, TransportCore, TransportId,
    transport_handle_event, transport_init_dtls,
};

pub type OnICEGatheringStateChangeHdlrFn = Box<
    dyn (FnMut(RTCIceGatheringState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

pub type OnICEConnectionStateChangeHdlrFn = Box<
    dyn (FnMut(RTCIceConnectionState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

pub type OnPeerConnectionStateChangeHdlrFn = Box<
    dyn (FnMut(RTCPeerConnectionState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

pub type OnSignalingStateChangeHdlrFn = Box<
    dyn (FnMut(RTCSignalingState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

pub type OnTrackHdlrFn = Box<
    dyn (FnMut(
            Arc<TrackRemote>,
            Arc<dyn RTCRtpReceiver>,
        ) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

/// The descriptions applied to a connection and the signaling state they led
/// to. Transitions are validated against this state, under its lock.
#[derive(Default)]
pub(crate) struct Descriptions {
    pub(crate) current_local: Option<RTCSessionDescription>,
    pub(crate) current_remote: Option<RTCSessionDescription>,
    pub(crate) signaling_state: RTCSignalingState,
}

impl Descriptions {
    pub(crate) fn local_session(&self) -> Option<&SessionDescription> {
        self.current_local.as_ref().and_then(|d| d.parsed.as_ref())
    }

    pub(crate) fn remote_session(&self) -> Option<&SessionDescription> {
        self.current_remote.as_ref().and_then(|d| d.parsed.as_ref())
    }
}

/// The state a connection shares with its transports and its dispatch loop.
pub(crate) struct PeerConnectionInternal {
    pub(crate) configuration: RTCConfiguration,
    pub(crate) setting_engine: Arc<SettingEngine>,
    pub(crate) media_engine: Arc<MediaEngine>,
    pub(crate) backend: Arc<dyn TransportBackend>,

    pub(crate) events_tx: mpsc::Sender<RTCEventInternal>,
    notify_tx: mpsc::UnboundedSender<Notification>,
    next_transport_id: AtomicU64,

    pub(crate) transports: Mutex<Vec<RTCTransport>>,
    pub(crate) rtp_transceivers: Mutex<Vec<Arc<RTCRtpTransceiver>>>,
    pub(crate) descriptions: Mutex<Descriptions>,

    // read-only mirrors of the states owned by the dispatch loop
    pub(crate) signaling_state: AtomicU8,
    pub(crate) ice_gathering_state: AtomicU8,
    pub(crate) ice_connection_state: AtomicU8,
    pub(crate) peer_connection_state: AtomicU8,
    pub(crate) is_closed: AtomicBool,

    on_ice_candidate_handler: Mutex<Option<OnLocalCandidateHdlrFn>>,
    on_ice_gathering_state_change_handler: Mutex<Option<OnICEGatheringStateChangeHdlrFn>>,
    on_ice_connection_state_change_handler: Mutex<Option<OnICEConnectionStateChangeHdlrFn>>,
    on_peer_connection_state_change_handler: Mutex<Option<OnPeerConnectionStateChangeHdlrFn>>,
    on_signaling_state_change_handler: Mutex<Option<OnSignalingStateChangeHdlrFn>>,
    on_track_handler: Mutex<Option<OnTrackHdlrFn>>,
}

impl PeerConnectionInternal {
    pub(crate) fn do_ice_candidate(&self, candidate: Option<RTCIceCandidate>) {
        self.notify(Notification::IceCandidate(candidate));
    }

    pub(crate) fn do_ice_gathering_state_change(&self, state: RTCIceGatheringState) {
        self.ice_gathering_state.store(state as u8, Ordering::SeqCst);

        log::info!("ICE gathering state changed: {state}");
        self.notify(Notification::IceGatheringState(state));
    }

    pub(crate) fn do_ice_connection_state_change(&self, state: RTCIceConnectionState) {
        self.ice_connection_state.store(state as u8, Ordering::SeqCst);

        log::info!("ICE connection state changed: {state}");
        self.notify(Notification::IceConnectionState(state));
    }

    pub(crate) fn do_peer_connection_state_change(&self, state: RTCPeerConnectionState) {
        self.peer_connection_state.store(state as u8, Ordering::SeqCst);

        log::info!("peer connection state changed: {state}");
        self.notify(Notification::PeerConnectionState(state));
    }

    pub(crate) fn do_signaling_state_change(&self, state: RTCSignalingState) {
        self.signaling_state.store(state as u8, Ordering::SeqCst);

        log::info!("signaling state changed to {state}");
        self.notify(Notification::SignalingState(state));
    }

    fn notify(&self, notification: Notification) {
        if let Err(err) = self.notify_tx.send(notification) {
            log::debug!("notifier is gone, dropping {:?}", err.0);
        }
    }

    /// Runs the application handler registered for `notification`, if any.
    pub(crate) async fn deliver(&self, notification: Notification) {
        match notification {
            Notification::IceCandidate(candidate) => {
                let mut handler = self.on_ice_candidate_handler.lock().await;
                if let Some(f) = &mut *handler {
                    f(candidate).await;
                }
            }
            Notification::IceGatheringState(state) => {
                let mut handler = self.on_ice_gathering_state_change_handler.lock().await;
                if let Some(f) = &mut *handler {
                    f(state).await;
                }
            }
            Notification::IceConnectionState(state) => {
                let mut handler = self.on_ice_connection_state_change_handler.lock().await;
                if let Some(f) = &mut *handler {
                    f(state).await;
                }
            }
            Notification::PeerConnectionState(state) => {
                let mut handler = self.on_peer_connection_state_change_handler.lock().await;
                if let Some(f) = &mut *handler {
                    f(state).await;
                }
            }
            Notification::SignalingState(state) => {
                let mut handler = self.on_signaling_state_change_handler.lock().await;
                if let Some(f) = &mut *handler {
                    f(state).await;
                }
            }
        }
    }

    pub(crate) async fn do_track(&self, track: Arc<TrackRemote>, receiver: Arc<dyn RTCRtpReceiver>) {
        log::debug!("got new track: {}", track.id().await);

        let mut handler = self.on_track_handler.lock().await;
        if let Some(f) = &mut *handler {
            f(track, receiver).await;
        } else {
            log::warn!("on_track unset, unable to handle incoming media streams");
        }
    }

    async fn send_event(&self, event: RTCEventInternal) {
        if let Err(err) = self.events_tx.send(event).await {
            log::warn!("dispatch loop is gone, dropping {}", err.0);
        }
    }
}

/// RTCPeerConnection represents a WebRTC connection that establishes a
/// peer-to-peer communications with another RTCPeerConnection instance in a
/// browser, or to another endpoint implementing the required protocols.
///
/// All of its state changes happen on its dispatch loop, fed by the events its
/// transports produce. The handle applies descriptions, registers transports
/// and transceivers and reads the states the loop published. Handlers run on
/// a separate notifier task, so they may call back into the connection.
pub struct RTCPeerConnection {
    internal: Arc<PeerConnectionInternal>,
}

impl RTCPeerConnection {
    /// creates a PeerConnection with the configuration provided and starts its
    /// dispatch loop. A configuration without certificates gets a fresh one.
    pub(crate) fn new(api: &API, mut configuration: RTCConfiguration) -> Result<Self> {
        if configuration.certificates.is_empty() {
            configuration.certificates = vec![RTCCertificate::generate()?];
        }

        let (events_tx, events_rx) = mpsc::channel(1);
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let internal = Arc::new(PeerConnectionInternal {
            configuration,
            setting_engine: Arc::clone(&api.setting_engine),
            media_engine: Arc::clone(&api.media_engine),
            backend: Arc::clone(&api.backend),

            events_tx,
            notify_tx,
            next_transport_id: AtomicU64::new(0),

            transports: Mutex::new(vec![]),
            rtp_transceivers: Mutex::new(vec![]),
            descriptions: Mutex::new(Descriptions::default()),

            signaling_state: AtomicU8::new(RTCSignalingState::Stable as u8),
            ice_gathering_state: AtomicU8::new(RTCIceGatheringState::New as u8),
            ice_connection_state: AtomicU8::new(RTCIceConnectionState::New as u8),
            peer_connection_state: AtomicU8::new(RTCPeerConnectionState::New as u8),
            is_closed: AtomicBool::new(false),

            on_ice_candidate_handler: Mutex::new(None),
            on_ice_gathering_state_change_handler: Mutex::new(None),
            on_ice_connection_state_change_handler: Mutex::new(None),
            on_peer_connection_state_change_handler: Mutex::new(None),
            on_signaling_state_change_handler: Mutex::new(None),
            on_track_handler: Mutex::new(None),
        });

        let dispatcher = EventDispatcher::new(Arc::downgrade(&internal));
        tokio::spawn(dispatcher.run(events_rx));
        tokio::spawn(run_notifier(Arc::downgrade(&internal), notify_rx));

        Ok(RTCPeerConnection { internal })
    }

    fn check_closed(&self) -> Result<()> {
        if self.internal.is_closed.load(Ordering::SeqCst) {
            Err(Error::ErrConnectionClosed)
        } else {
            Ok(())
        }
    }

    /// on_ice_candidate sets an event handler which is invoked when a new ICE
    /// candidate is found.
    /// Take note that the handler is gonna be called with None when
    /// gathering is finished.
    pub async fn on_ice_candidate(&self, f: OnLocalCandidateHdlrFn) {
        *self.internal.on_ice_candidate_handler.lock().await = Some(f);
    }

    /// on_ice_gathering_state_change sets an event handler which is invoked when the
    /// ICE candidate gathering state of the connection has changed.
    pub async fn on_ice_gathering_state_change(&self, f: OnICEGatheringStateChangeHdlrFn) {
        *self.internal.on_ice_gathering_state_change_handler.lock().await = Some(f);
    }

    /// on_ice_connection_state_change sets an event handler which is called
    /// when an ICE connection state is changed.
    pub async fn on_ice_connection_state_change(&self, f: OnICEConnectionStateChangeHdlrFn) {
        *self.internal.on_ice_connection_state_change_handler.lock().await = Some(f);
    }

    /// on_peer_connection_state_change sets an event handler which is called
    /// when the PeerConnectionState has changed
    pub async fn on_peer_connection_state_change(&self, f: OnPeerConnectionStateChangeHdlrFn) {
        *self.internal.on_peer_connection_state_change_handler.lock().await = Some(f);
    }

    /// on_signaling_state_change sets an event handler which is invoked when the
    /// peer connection's signaling state changes
    pub async fn on_signaling_state_change(&self, f: OnSignalingStateChangeHdlrFn) {
        *self.internal.on_signaling_state_change_handler.lock().await = Some(f);
    }

    /// on_track sets an event handler which is called when remote track
    /// arrives from a remote peer.
    pub async fn on_track(&self, f: OnTrackHdlrFn) {
        *self.internal.on_track_handler.lock().await = Some(f);
    }

    /// add_transceiver_from_kind creates a new transceiver of `kind`. It gets a
    /// receiver from the transport backend when `direction` can receive.
    pub async fn add_transceiver_from_kind(
        &self,
        kind: RtpCodecKind,
        direction: RTCRtpTransceiverDirection,
    ) -> Result<Arc<RTCRtpTransceiver>> {
        self.check_closed()?;
        if kind == RtpCodecKind::Unspecified || direction == RTCRtpTransceiverDirection::Unspecified
        {
            return Err(Error::ErrUnknownType);
        }

        let receiver = if direction.has_recv() {
            Some(self.internal.backend.new_rtp_receiver(kind))
        } else {
            None
        };
        let transceiver = RTCRtpTransceiver::new(kind, direction, None, receiver);
        self.internal
            .rtp_transceivers
            .lock()
            .await
            .push(Arc::clone(&transceiver));

        Ok(transceiver)
    }

    /// add_transceiver_from_sender creates a new transceiver sending the track
    /// of `sender`. The transceiver also receives when `direction` is sendrecv.
    pub async fn add_transceiver_from_sender(
        &self,
        sender: Arc<dyn RTCRtpSender>,
        direction: RTCRtpTransceiverDirection,
    ) -> Result<Arc<RTCRtpTransceiver>> {
        self.check_closed()?;
        let track = sender.track().ok_or(Error::ErrTrackNotExisted)?;
        if !direction.has_send() {
            return Err(Error::ErrRTPTransceiverSetSendingInvalidState);
        }

        let receiver = if direction.has_recv() {
            Some(self.internal.backend.new_rtp_receiver(track.kind))
        } else {
            None
        };
        let transceiver = RTCRtpTransceiver::new(track.kind, direction, Some(sender), receiver);
        self.internal
            .rtp_transceivers
            .lock()
            .await
            .push(Arc::clone(&transceiver));

        Ok(transceiver)
    }

    fn new_transport_core(&self) -> (TransportCore, mpsc::Receiver<RTCEventInternal>) {
        let id = TransportId(self.internal.next_transport_id.fetch_add(1, Ordering::SeqCst));
        let (events_tx, events_rx) = mpsc::channel(1);
        (
            TransportCore::new(id, Arc::downgrade(&self.internal), events_tx),
            events_rx,
        )
    }

    /// Starts the loop of `transport`, creates its sub-transports and registers
    /// it. A transport whose sub-transports can't be created is torn down.
    async fn register_transport<T: Transport>(
        &self,
        transport: Arc<T>,
        events_rx: mpsc::Receiver<RTCEventInternal>,
        wrap: fn(Arc<T>) -> RTCTransport,
    ) -> Result<Arc<T>> {
        tokio::spawn(transport_handle_event(Arc::clone(&transport), events_rx));

        if let Err(err) = transport_init_dtls(transport.as_ref()).await {
            log::error!("{}: initialization failed: {}", transport.id(), err);
            transport.core().terminate().await;
            return Err(Error::ErrTransportNotInitialized);
        }

        self.internal
            .transports
            .lock()
            .await
            .push(wrap(Arc::clone(&transport)));
        transport.core().set_state(TransportState::New).await;

        Ok(transport)
    }

    /// add_media_transport creates a transport carrying `rtp_transceivers`
    /// bundled together.
    pub async fn add_media_transport(
        &self,
        rtp_transceivers: Vec<Arc<RTCRtpTransceiver>>,
    ) -> Result<Arc<MediaTransport>> {
        self.check_closed()?;
        if rtp_transceivers.is_empty() {
            return Err(Error::ErrNoTransceivers);
        }

        let (core, events_rx) = self.new_transport_core();
        let transport = Arc::new(MediaTransport::new(core, rtp_transceivers));
        self.register_transport(transport, events_rx, RTCTransport::Media)
            .await
    }

    /// add_application_transport creates a transport carrying data channels
    /// for the media section `mid`.
    pub async fn add_application_transport(
        &self,
        mid: Option<String>,
    ) -> Result<Arc<ApplicationTransport>> {
        self.check_closed()?;

        let (core, events_rx) = self.new_transport_core();
        let transport = Arc::new(ApplicationTransport::new(core, mid));
        self.register_transport(transport, events_rx, RTCTransport::Application)
            .await
    }

    /// add_ice_candidate hands a remote candidate to the transport negotiated
    /// for `mid`. None signals the end of remote candidates.
    pub async fn add_ice_candidate(
        &self,
        mid: &str,
        candidate: Option<RTCIceCandidate>,
    ) -> Result<()> {
        self.check_closed()?;

        let transports = self.internal.transports.lock().await.clone();
        for transport in transports {
            transport.add_ice_candidate(mid, candidate.clone()).await?;
        }
        Ok(())
    }

    /// set_local_description sets the SessionDescription of the local peer
    pub async fn set_local_description(&self, desc: RTCSessionDescription) -> Result<()> {
        self.set_description(desc, StateChangeOp::SetLocal).await
    }

    /// set_remote_description sets the SessionDescription of the remote peer
    pub async fn set_remote_description(&self, desc: RTCSessionDescription) -> Result<()> {
        self.set_description(desc, StateChangeOp::SetRemote).await
    }

    async fn set_description(
        &self,
        mut desc: RTCSessionDescription,
        op: StateChangeOp,
    ) -> Result<()> {
        self.check_closed()?;
        if desc.sdp_type == RTCSdpType::Unspecified {
            return Err(Error::ErrUnknownType);
        }
        if desc.sdp_type != RTCSdpType::Rollback {
            desc.parsed()?;
        }

        let next_state = {
            let mut descriptions = self.internal.descriptions.lock().await;
            let next_state = check_next_signaling_state(
                descriptions.signaling_state,
                signaling_state_after(op, desc.sdp_type),
                op,
                desc.sdp_type,
            )?;

            let applied = if desc.sdp_type == RTCSdpType::Rollback {
                None
            } else {
                Some(desc)
            };
            match op {
                StateChangeOp::SetLocal => descriptions.current_local = applied,
                StateChangeOp::SetRemote => descriptions.current_remote = applied,
            }
            descriptions.signaling_state = next_state;
            next_state
        };

        self.update_negotiation().await;

        self.internal
            .send_event(RTCEventInternal::SignalingStateEvent(next_state))
            .await;
        Ok(())
    }

    /// Records what each side declared for every negotiated mid on its
    /// transceiver, and the role agreed for each transport.
    async fn update_negotiation(&self) {
        let mut transceivers = vec![];
        for transceiver in self.internal.rtp_transceivers.lock().await.iter() {
            if let Some(mid) = transceiver.mid().await {
                transceivers.push((Arc::clone(transceiver), mid));
            }
        }
        let mut transports = vec![];
        for transport in self.internal.transports.lock().await.iter() {
            if let Some(mid) = transport.as_transport().local_mid().await {
                transports.push((transport.clone(), mid));
            }
        }

        let declared = |descriptions: &Descriptions, mid: &str| {
            let local = descriptions
                .local_session()
                .and_then(|s| DeclaredNegotiation::from_description(s, mid))
                .unwrap_or_default();
            let remote = descriptions
                .remote_session()
                .and_then(|s| DeclaredNegotiation::from_description(s, mid))
                .unwrap_or_default();
            (local, remote)
        };
        let (transceiver_updates, transport_updates): (Vec<_>, Vec<_>) = {
            let descriptions = self.internal.descriptions.lock().await;
            (
                transceivers
                    .into_iter()
                    .map(|(t, mid)| (t, declared(&descriptions, &mid)))
                    .collect(),
                transports
                    .into_iter()
                    .map(|(t, mid)| (t, declared(&descriptions, &mid)))
                    .collect(),
            )
        };

        for (transceiver, (local, remote)) in transceiver_updates {
            transceiver.set_local_negotiation(local).await;
            transceiver.set_remote_negotiation(remote).await;
        }
        for (transport, (local, remote)) in transport_updates {
            let role = negotiate_dtls_role(local.dtls_role, remote.dtls_role);
            log::trace!("{}: negotiated DTLS role {}", transport.id(), role);
            transport.as_transport().set_dtls_role(role);
        }
    }

    /// write_rtcp sends a user provided RTCP packet to the connected peer over
    /// the first media transport.
    pub async fn write_rtcp(
        &self,
        packets: &[Box<dyn rtcp::packet::Packet + Send + Sync>],
    ) -> Result<usize> {
        let transport = self
            .internal
            .transports
            .lock()
            .await
            .iter()
            .find_map(|t| match t {
                RTCTransport::Media(media) => Some(Arc::clone(media)),
                RTCTransport::Application(_) => None,
            })
            .ok_or(Error::ErrNoMediaTransport)?;

        transport.write_rtcp(packets).await
    }

    /// close ends the PeerConnection: transceivers are stopped, transports
    /// disconnected and the dispatch loop terminated. Calling it again does
    /// nothing.
    pub async fn close(&self) -> Result<()> {
        if self.internal.is_closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        for transceiver in self.get_transceivers().await {
            if let Err(err) = transceiver.stop().await {
                log::warn!("failed to stop transceiver: {err}");
            }
        }
        for transport in self.get_transports().await {
            transport.disconnect().await;
        }

        self.internal.descriptions.lock().await.signaling_state = RTCSignalingState::Closed;
        self.internal
            .send_event(RTCEventInternal::SignalingStateEvent(
                RTCSignalingState::Closed,
            ))
            .await;
        self.internal
            .send_event(RTCEventInternal::ConnectionStateEvent(
                RTCPeerConnectionState::Closed,
            ))
            .await;
        self.internal
            .send_event(RTCEventInternal::TerminationEvent)
            .await;

        Ok(())
    }

    pub async fn get_transceivers(&self) -> Vec<Arc<RTCRtpTransceiver>> {
        self.internal.rtp_transceivers.lock().await.clone()
    }

    pub async fn get_transports(&self) -> Vec<RTCTransport> {
        self.internal.transports.lock().await.clone()
    }

    /// current_local_description returns the local description last applied.
    pub async fn current_local_description(&self) -> Option<RTCSessionDescription> {
        self.internal.descriptions.lock().await.current_local.clone()
    }

    /// current_remote_description returns the remote description last applied.
    pub async fn current_remote_description(&self) -> Option<RTCSessionDescription> {
        self.internal.descriptions.lock().await.current_remote.clone()
    }

    /// signaling_state attribute returns the signaling state of the
    /// PeerConnection instance.
    pub fn signaling_state(&self) -> RTCSignalingState {
        self.internal.signaling_state.load(Ordering::SeqCst).into()
    }

    /// ice_gathering_state attribute returns the ICE gathering state of the
    /// PeerConnection instance.
    pub fn ice_gathering_state(&self) -> RTCIceGatheringState {
        self.internal
            .ice_gathering_state
            .load(Ordering::SeqCst)
            .into()
    }

    /// ice_connection_state returns the ICE connection state of the
    /// PeerConnection instance.
    pub fn ice_connection_state(&self) -> RTCIceConnectionState {
        self.internal
            .ice_connection_state
            .load(Ordering::SeqCst)
            .into()
    }

    /// connection_state attribute returns the connection state of the
    /// PeerConnection instance.
    pub fn connection_state(&self) -> RTCPeerConnectionState {
        self.internal
            .peer_connection_state
            .load(Ordering::SeqCst)
            .into()
    }
}
