use std::sync::Arc;

use async_trait::async_trait;

use super::RTCRtpCodingParameters;
use super::rtp_codec::{PayloadType, RtpCodecKind};
use crate::media_stream::track_remote::TrackRemote;
use crate::peer_connection::transport::dtls::RTCDtlsTransport;
use shared::error::Result;

/// RTCRtpReceiveParameters contains the RTP stack settings used by receivers.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RTCRtpReceiveParameters {
    pub encodings: Vec<RTCRtpCodingParameters>,
}

/// RTCRtpReceiver reads the packets of one inbound stream from the SRTP
/// session of its transport.
#[async_trait]
pub trait RTCRtpReceiver: Send + Sync {
    fn kind(&self) -> RtpCodecKind;

    /// The track inbound packets are delivered to.
    fn track(&self) -> Arc<TrackRemote>;

    /// receive opens the stream of the SSRC in `params` on the SRTP session of
    /// `transport`.
    async fn receive(
        &self,
        transport: Arc<dyn RTCDtlsTransport>,
        params: RTCRtpReceiveParameters,
    ) -> Result<()>;

    /// determine_payload_type reads the first packet of the stream and reports
    /// its payload type.
    async fn determine_payload_type(&self) -> Result<PayloadType>;

    /// stop irreversibly stops the receiver.
    async fn stop(&self) -> Result<()>;
}
