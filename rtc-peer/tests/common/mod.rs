//! Mock protocol engines for driving a connection through its cascade.
//!
//! The ICE and DTLS mocks never progress on their own: tests move them with
//! `set_state`, the way a real agent would report connectivity and handshake
//! results.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use rtc_peer::api::{API, APIBuilder, TransportBackend};
use rtc_peer::media_stream::track_local::TrackLocal;
use rtc_peer::media_stream::track_remote::TrackRemote;
use rtc_peer::peer_connection::certificate::RTCCertificate;
use rtc_peer::peer_connection::RTCPeerConnection;
use rtc_peer::peer_connection::configuration::media_engine::MediaEngine;
use rtc_peer::peer_connection::sdp::RTCSessionDescription;
use rtc_peer::peer_connection::transport::dtls::parameters::DTLSParameters;
use rtc_peer::peer_connection::transport::dtls::state::RTCDtlsTransportState;
use rtc_peer::peer_connection::transport::dtls::{
    OnDtlsTransportStateChangeHdlrFn, RTCDtlsTransport, SrtpSession, SrtpStream,
};
use rtc_peer::peer_connection::transport::ice::candidate::RTCIceCandidate;
use rtc_peer::peer_connection::transport::ice::gatherer_state::RTCIceGathererState;
use rtc_peer::peer_connection::transport::ice::parameters::RTCIceParameters;
use rtc_peer::peer_connection::transport::ice::role::RTCIceRole;
use rtc_peer::peer_connection::transport::ice::state::RTCIceTransportState;
use rtc_peer::peer_connection::transport::ice::{
    OnICEGathererStateChangeHdlrFn, OnICETransportStateChangeHdlrFn, OnLocalCandidateHdlrFn,
    RTCIceGatherOptions, RTCIceGatherer, RTCIceTransport,
};
use rtc_peer::peer_connection::transport::sctp::{RTCSctpTransport, SCTPTransportCapabilities};
use rtc_peer::rtp_transceiver::rtp_codec::{PayloadType, RtpCodecKind};
use rtc_peer::rtp_transceiver::rtp_receiver::{RTCRtpReceiveParameters, RTCRtpReceiver};
use rtc_peer::rtp_transceiver::rtp_sender::{RTCRtpSendParameters, RTCRtpSender};
use shared::error::{Error, Result};

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub const REMOTE_UFRAG: &str = "remoteufrag";
pub const REMOTE_PWD: &str = "remotepasswordremotepassword";
pub const REMOTE_FINGERPRINT: &str = "sha-256 \
0F:74:31:25:CB:A2:13:EC:28:6F:6D:2C:61:FF:5D:C2:BC:B9:DB:3D:98:14:8D:1A:BB:EA:33:0C:A4:60:A8:8E";

pub fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Polls `f` until it holds, failing the test after [`TIMEOUT`].
pub async fn eventually<F: Fn() -> bool>(what: &str, f: F) {
    let polled = tokio::time::timeout(TIMEOUT, async {
        while !f() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "timed out waiting for {what}");
}

/// Applies a remote offer and a local answer, leaving the connection stable.
pub async fn negotiate(pc: &RTCPeerConnection, offer: String, answer: String) {
    pc.set_remote_description(RTCSessionDescription::offer(offer).expect("offer"))
        .await
        .expect("set remote offer");
    pc.set_local_description(RTCSessionDescription::answer(answer).expect("answer"))
        .await
        .expect("set local answer");
}

/// Reports ICE connected on transport `i` once it started its checks, then
/// completes its DTLS handshake.
pub async fn connect(backend: &MockBackend, i: usize) {
    eventually("transport created", || {
        backend.dtls_transports.lock().unwrap().len() > i
    })
    .await;

    let ice_transport = backend.ice_transport(i);
    eventually("ICE start", || {
        !ice_transport.started.lock().unwrap().is_empty()
    })
    .await;
    ice_transport.set_state(RTCIceTransportState::Connected).await;

    let dtls_transport = backend.dtls_transport(i);
    eventually("DTLS start", || {
        !dtls_transport.started.lock().unwrap().is_empty()
    })
    .await;
    dtls_transport
        .set_state(RTCDtlsTransportState::Connected)
        .await;
}

async fn call<T, F>(handler: &Mutex<Option<Box<F>>>, value: T)
where
    F: ?Sized + FnMut(T) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
{
    let fut = {
        let mut handler = handler.lock().unwrap();
        handler.as_mut().map(|f| f(value))
    };
    if let Some(fut) = fut {
        fut.await;
    }
}

#[derive(Default)]
pub struct MockIceGatherer {
    on_local_candidate: Mutex<Option<OnLocalCandidateHdlrFn>>,
    on_state_change: Mutex<Option<OnICEGathererStateChangeHdlrFn>>,
    state: Mutex<RTCIceGathererState>,
    local_parameters: RTCIceParameters,
    manual: bool,
    pub gathered: AtomicUsize,
}

impl MockIceGatherer {
    pub async fn set_state(&self, state: RTCIceGathererState) {
        *self.state.lock().unwrap() = state;
        call(&self.on_state_change, state).await;
    }

    pub async fn emit_candidate(&self, candidate: Option<RTCIceCandidate>) {
        call(&self.on_local_candidate, candidate).await;
    }
}

pub fn host_candidate() -> RTCIceCandidate {
    RTCIceCandidate {
        foundation: "1".to_owned(),
        priority: 2130706431,
        address: "192.168.1.100".to_owned(),
        protocol: "udp".to_owned(),
        port: 54321,
        typ: "host".to_owned(),
        component: 1,
        ..Default::default()
    }
}

#[async_trait]
impl RTCIceGatherer for MockIceGatherer {
    /// Gathers a single host candidate, unless the test drives gathering
    /// itself.
    async fn gather(&self) -> Result<()> {
        self.gathered.fetch_add(1, Ordering::SeqCst);
        if self.manual {
            return Ok(());
        }
        self.set_state(RTCIceGathererState::Gathering).await;
        self.emit_candidate(Some(host_candidate())).await;
        self.set_state(RTCIceGathererState::Complete).await;
        Ok(())
    }

    fn on_local_candidate(&self, f: OnLocalCandidateHdlrFn) {
        *self.on_local_candidate.lock().unwrap() = Some(f);
    }

    fn on_state_change(&self, f: OnICEGathererStateChangeHdlrFn) {
        *self.on_state_change.lock().unwrap() = Some(f);
    }

    fn state(&self) -> RTCIceGathererState {
        *self.state.lock().unwrap()
    }

    fn local_parameters(&self) -> RTCIceParameters {
        self.local_parameters.clone()
    }
}

pub struct MockIceTransport {
    gatherer: Arc<dyn RTCIceGatherer>,
    on_connection_state_change: Mutex<Option<OnICETransportStateChangeHdlrFn>>,
    state: Mutex<RTCIceTransportState>,
    pub started: Mutex<Vec<(RTCIceParameters, RTCIceRole)>>,
    pub remote_candidates: Mutex<Vec<Option<RTCIceCandidate>>>,
}

impl MockIceTransport {
    pub async fn set_state(&self, state: RTCIceTransportState) {
        *self.state.lock().unwrap() = state;
        call(&self.on_connection_state_change, state).await;
    }
}

#[async_trait]
impl RTCIceTransport for MockIceTransport {
    fn gatherer(&self) -> Arc<dyn RTCIceGatherer> {
        Arc::clone(&self.gatherer)
    }

    async fn start(&self, params: RTCIceParameters, role: RTCIceRole) -> Result<()> {
        self.started.lock().unwrap().push((params, role));
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: Option<RTCIceCandidate>) -> Result<()> {
        self.remote_candidates.lock().unwrap().push(candidate);
        Ok(())
    }

    fn on_connection_state_change(&self, f: OnICETransportStateChangeHdlrFn) {
        *self.on_connection_state_change.lock().unwrap() = Some(f);
    }

    fn state(&self) -> RTCIceTransportState {
        *self.state.lock().unwrap()
    }

    async fn stop(&self) -> Result<()> {
        self.set_state(RTCIceTransportState::Closed).await;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSrtpStream {
    pub written: Mutex<Vec<Bytes>>,
}

#[async_trait]
impl SrtpStream for MockSrtpStream {
    fn ssrc(&self) -> u32 {
        0
    }

    async fn write(&self, buf: &Bytes) -> Result<usize> {
        self.written.lock().unwrap().push(buf.clone());
        Ok(buf.len())
    }
}

#[derive(Default)]
pub struct MockSrtpSession {
    pub write_stream: Arc<MockSrtpStream>,
}

#[async_trait]
impl SrtpSession for MockSrtpSession {
    async fn open_write_stream(&self) -> Result<Arc<dyn SrtpStream>> {
        Ok(Arc::clone(&self.write_stream) as Arc<dyn SrtpStream>)
    }

    /// Nothing is ever left unhandled: the session reports itself closed.
    async fn accept_stream(&self) -> Result<Arc<dyn SrtpStream>> {
        Err(Error::ErrConnectionClosed)
    }
}

pub struct MockDtlsTransport {
    ice_transport: Arc<dyn RTCIceTransport>,
    on_state_change: Mutex<Option<OnDtlsTransportStateChangeHdlrFn>>,
    state: Mutex<RTCDtlsTransportState>,
    pub started: Mutex<Vec<DTLSParameters>>,
    pub stopped: AtomicUsize,
    pub srtp_session: Arc<MockSrtpSession>,
    pub srtcp_session: Arc<MockSrtpSession>,
}

impl MockDtlsTransport {
    pub async fn set_state(&self, state: RTCDtlsTransportState) {
        *self.state.lock().unwrap() = state;
        call(&self.on_state_change, state).await;
    }
}

#[async_trait]
impl RTCDtlsTransport for MockDtlsTransport {
    fn ice_transport(&self) -> Arc<dyn RTCIceTransport> {
        Arc::clone(&self.ice_transport)
    }

    async fn start(&self, remote_parameters: DTLSParameters) -> Result<()> {
        self.started.lock().unwrap().push(remote_parameters);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_state_change(&self, f: OnDtlsTransportStateChangeHdlrFn) {
        *self.on_state_change.lock().unwrap() = Some(f);
    }

    fn state(&self) -> RTCDtlsTransportState {
        *self.state.lock().unwrap()
    }

    async fn srtp_session(&self) -> Option<Arc<dyn SrtpSession>> {
        (self.state() == RTCDtlsTransportState::Connected)
            .then(|| Arc::clone(&self.srtp_session) as Arc<dyn SrtpSession>)
    }

    async fn srtcp_session(&self) -> Option<Arc<dyn SrtpSession>> {
        (self.state() == RTCDtlsTransportState::Connected)
            .then(|| Arc::clone(&self.srtcp_session) as Arc<dyn SrtpSession>)
    }
}

#[derive(Default)]
pub struct MockSctpTransport {
    pub started: Mutex<Vec<SCTPTransportCapabilities>>,
    pub stopped: AtomicBool,
}

#[async_trait]
impl RTCSctpTransport for MockSctpTransport {
    async fn start(&self, remote_caps: SCTPTransportCapabilities) -> Result<()> {
        self.started.lock().unwrap().push(remote_caps);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockSender {
    track: Option<TrackLocal>,
    pub sent: Mutex<Vec<RTCRtpSendParameters>>,
    pub stopped: AtomicBool,
}

impl MockSender {
    pub fn new(track: Option<TrackLocal>) -> Arc<Self> {
        Arc::new(MockSender {
            track,
            sent: Mutex::new(vec![]),
            stopped: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl RTCRtpSender for MockSender {
    fn track(&self) -> Option<TrackLocal> {
        self.track.clone()
    }

    async fn send(&self, params: RTCRtpSendParameters) -> Result<()> {
        self.sent.lock().unwrap().push(params);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockReceiver {
    kind: RtpCodecKind,
    track: Arc<TrackRemote>,
    payload_type: PayloadType,
    pub received: Mutex<Vec<RTCRtpReceiveParameters>>,
    pub stopped: AtomicBool,
}

#[async_trait]
impl RTCRtpReceiver for MockReceiver {
    fn kind(&self) -> RtpCodecKind {
        self.kind
    }

    fn track(&self) -> Arc<TrackRemote> {
        Arc::clone(&self.track)
    }

    async fn receive(
        &self,
        _transport: Arc<dyn RTCDtlsTransport>,
        params: RTCRtpReceiveParameters,
    ) -> Result<()> {
        self.received.lock().unwrap().push(params);
        Ok(())
    }

    async fn determine_payload_type(&self) -> Result<PayloadType> {
        Ok(self.payload_type)
    }

    async fn stop(&self) -> Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// MockBackend keeps every engine it created so tests can drive them.
#[derive(Default)]
pub struct MockBackend {
    pub fail_dtls_transport: AtomicBool,
    pub manual_gathering: AtomicBool,
    pub gatherers: Mutex<Vec<Arc<MockIceGatherer>>>,
    pub ice_transports: Mutex<Vec<Arc<MockIceTransport>>>,
    pub dtls_transports: Mutex<Vec<Arc<MockDtlsTransport>>>,
    pub sctp_transports: Mutex<Vec<Arc<MockSctpTransport>>>,
    pub receivers: Mutex<Vec<Arc<MockReceiver>>>,
}

impl MockBackend {
    pub fn ice_transport(&self, i: usize) -> Arc<MockIceTransport> {
        Arc::clone(&self.ice_transports.lock().unwrap()[i])
    }

    pub fn gatherer(&self, i: usize) -> Arc<MockIceGatherer> {
        Arc::clone(&self.gatherers.lock().unwrap()[i])
    }

    pub fn dtls_transport(&self, i: usize) -> Arc<MockDtlsTransport> {
        Arc::clone(&self.dtls_transports.lock().unwrap()[i])
    }

    pub fn receiver(&self, i: usize) -> Arc<MockReceiver> {
        Arc::clone(&self.receivers.lock().unwrap()[i])
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers.lock().unwrap().len()
    }
}

impl TransportBackend for MockBackend {
    fn new_ice_gatherer(&self, opts: RTCIceGatherOptions) -> Result<Arc<dyn RTCIceGatherer>> {
        let gatherer = Arc::new(MockIceGatherer {
            local_parameters: opts.local_parameters,
            manual: self.manual_gathering.load(Ordering::SeqCst),
            ..Default::default()
        });
        self.gatherers.lock().unwrap().push(Arc::clone(&gatherer));
        Ok(gatherer)
    }

    fn new_ice_transport(&self, gatherer: Arc<dyn RTCIceGatherer>) -> Arc<dyn RTCIceTransport> {
        let ice_transport = Arc::new(MockIceTransport {
            gatherer,
            on_connection_state_change: Mutex::new(None),
            state: Mutex::new(RTCIceTransportState::New),
            started: Mutex::new(vec![]),
            remote_candidates: Mutex::new(vec![]),
        });
        self.ice_transports
            .lock()
            .unwrap()
            .push(Arc::clone(&ice_transport));
        ice_transport
    }

    fn new_dtls_transport(
        &self,
        ice_transport: Arc<dyn RTCIceTransport>,
        certificates: Vec<RTCCertificate>,
    ) -> Result<Arc<dyn RTCDtlsTransport>> {
        if self.fail_dtls_transport.load(Ordering::SeqCst) {
            return Err(Error::Other("no DTLS for you".to_owned()));
        }
        assert!(!certificates.is_empty());

        let dtls_transport = Arc::new(MockDtlsTransport {
            ice_transport,
            on_state_change: Mutex::new(None),
            state: Mutex::new(RTCDtlsTransportState::New),
            started: Mutex::new(vec![]),
            stopped: AtomicUsize::new(0),
            srtp_session: Arc::new(MockSrtpSession::default()),
            srtcp_session: Arc::new(MockSrtpSession::default()),
        });
        self.dtls_transports
            .lock()
            .unwrap()
            .push(Arc::clone(&dtls_transport));
        Ok(dtls_transport)
    }

    fn new_sctp_transport(
        &self,
        _dtls_transport: Arc<dyn RTCDtlsTransport>,
    ) -> Result<Arc<dyn RTCSctpTransport>> {
        let sctp_transport = Arc::new(MockSctpTransport::default());
        self.sctp_transports
            .lock()
            .unwrap()
            .push(Arc::clone(&sctp_transport));
        Ok(sctp_transport)
    }

    fn new_rtp_receiver(&self, kind: RtpCodecKind) -> Arc<dyn RTCRtpReceiver> {
        let receiver = Arc::new(MockReceiver {
            kind,
            track: Arc::new(TrackRemote::new(kind)),
            payload_type: 111,
            received: Mutex::new(vec![]),
            stopped: AtomicBool::new(false),
        });
        self.receivers.lock().unwrap().push(Arc::clone(&receiver));
        receiver
    }
}

pub fn new_api(backend: &Arc<MockBackend>) -> API {
    let mut media_engine = MediaEngine::default();
    media_engine
        .register_default_codecs()
        .expect("default codecs");

    APIBuilder::new()
        .with_media_engine(media_engine)
        .with_transport_backend(Arc::clone(backend) as Arc<dyn TransportBackend>)
        .build()
        .expect("api with a backend")
}

/// A description with one audio section per mid, each section carrying
/// `extra` lines of its own. Fingerprint and credentials are declared at
/// session level.
pub fn description(setup: &str, sections: &[(&str, &str, &str)]) -> String {
    let mut sdp = format!(
        "v=0\r\n\
o=- 4596489990601351948 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=fingerprint:{REMOTE_FINGERPRINT}\r\n\
a=ice-ufrag:{REMOTE_UFRAG}\r\n\
a=ice-pwd:{REMOTE_PWD}\r\n"
    );
    let mids: Vec<&str> = sections.iter().map(|(mid, _, _)| *mid).collect();
    sdp += &format!("a=group:BUNDLE {}\r\n", mids.join(" "));

    for (mid, kind, extra) in sections {
        let (port_line, rtpmap) = match *kind {
            "video" => ("m=video 9 UDP/TLS/RTP/SAVPF 96", "a=rtpmap:96 VP8/90000"),
            "application" => ("m=application 9 UDP/DTLS/SCTP webrtc-datachannel", ""),
            _ => ("m=audio 9 UDP/TLS/RTP/SAVPF 111", "a=rtpmap:111 opus/48000/2"),
        };
        sdp += &format!("{port_line}\r\nc=IN IP4 0.0.0.0\r\na=setup:{setup}\r\na=mid:{mid}\r\n");
        if !rtpmap.is_empty() {
            sdp += &format!("{rtpmap}\r\n");
        }
        sdp += extra;
    }

    sdp
}
