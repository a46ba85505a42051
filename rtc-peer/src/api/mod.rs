use std::sync::Arc;

use crate::peer_connection::RTCPeerConnection;
use crate::peer_connection::certificate::RTCCertificate;
use crate::peer_connection::configuration::RTCConfiguration;
use crate::peer_connection::configuration::media_engine::MediaEngine;
use crate::peer_connection::configuration::setting_engine::SettingEngine;
use crate::peer_connection::transport::dtls::RTCDtlsTransport;
use crate::peer_connection::transport::ice::{RTCIceGatherOptions, RTCIceGatherer, RTCIceTransport};
use crate::peer_connection::transport::sctp::RTCSctpTransport;
use crate::rtp_transceiver::rtp_codec::RtpCodecKind;
use crate::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use shared::error::{Error, Result};

/// TransportBackend creates the protocol engines a connection orchestrates.
///
/// The ICE agent, the DTLS handshake, SRTP and SCTP all live behind this
/// factory; the connection only sequences what it returns.
pub trait TransportBackend: Send + Sync {
    /// new_ice_gatherer creates a new ice gatherer.
    fn new_ice_gatherer(&self, opts: RTCIceGatherOptions) -> Result<Arc<dyn RTCIceGatherer>>;

    /// new_ice_transport creates a new ice transport over `gatherer`.
    fn new_ice_transport(&self, gatherer: Arc<dyn RTCIceGatherer>) -> Arc<dyn RTCIceTransport>;

    /// new_dtls_transport creates a new dtls transport over `ice_transport`,
    /// presenting `certificates` during the handshake.
    fn new_dtls_transport(
        &self,
        ice_transport: Arc<dyn RTCIceTransport>,
        certificates: Vec<RTCCertificate>,
    ) -> Result<Arc<dyn RTCDtlsTransport>>;

    /// new_sctp_transport creates a new SCTP transport over a connected
    /// `dtls_transport`.
    fn new_sctp_transport(
        &self,
        dtls_transport: Arc<dyn RTCDtlsTransport>,
    ) -> Result<Arc<dyn RTCSctpTransport>>;

    /// new_rtp_receiver constructs a new RTPReceiver
    fn new_rtp_receiver(&self, kind: RtpCodecKind) -> Arc<dyn RTCRtpReceiver>;
}

/// API bundles the engines and the transport backend every connection it
/// creates shares.
pub struct API {
    pub(crate) setting_engine: Arc<SettingEngine>,
    pub(crate) media_engine: Arc<MediaEngine>,
    pub(crate) backend: Arc<dyn TransportBackend>,
}

impl API {
    /// new_peer_connection creates a new PeerConnection with the provided configuration against the received API object.
    /// It must be called from within a tokio runtime.
    pub fn new_peer_connection(&self, configuration: RTCConfiguration) -> Result<RTCPeerConnection> {
        RTCPeerConnection::new(self, configuration)
    }

    /// Returns the internal [`SettingEngine`].
    pub fn setting_engine(&self) -> &SettingEngine {
        &self.setting_engine
    }

    /// Returns the internal [`MediaEngine`].
    pub fn media_engine(&self) -> &MediaEngine {
        &self.media_engine
    }
}

#[derive(Default)]
pub struct APIBuilder {
    setting_engine: Option<Arc<SettingEngine>>,
    media_engine: Option<MediaEngine>,
    backend: Option<Arc<dyn TransportBackend>>,
}

impl APIBuilder {
    pub fn new() -> Self {
        APIBuilder::default()
    }

    /// build fails with [`Error::ErrNoTransportBackend`] unless a backend was provided.
    pub fn build(mut self) -> Result<API> {
        Ok(API {
            setting_engine: self.setting_engine.take().unwrap_or_default(),
            media_engine: Arc::new(self.media_engine.take().unwrap_or_default()),
            backend: self.backend.take().ok_or(Error::ErrNoTransportBackend)?,
        })
    }

    /// WithSettingEngine allows providing a SettingEngine to the API.
    /// Settings should not be changed after passing the engine to an API.
    pub fn with_setting_engine(mut self, setting_engine: Arc<SettingEngine>) -> Self {
        self.setting_engine = Some(setting_engine);
        self
    }

    /// WithMediaEngine allows providing a MediaEngine to the API.
    pub fn with_media_engine(mut self, media_engine: MediaEngine) -> Self {
        self.media_engine = Some(media_engine);
        self
    }

    /// with_transport_backend provides the factory of the ICE, DTLS, SCTP and
    /// RTP engines.
    pub fn with_transport_backend(mut self, backend: Arc<dyn TransportBackend>) -> Self {
        self.backend = Some(backend);
        self
    }
}
