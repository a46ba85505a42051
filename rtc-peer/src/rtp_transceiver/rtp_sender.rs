use async_trait::async_trait;

use super::RTCRtpCodingParameters;
use crate::media_stream::track_local::TrackLocal;
use shared::error::Result;

/// RTCRtpSendParameters contains the RTP stack settings used by senders.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RTCRtpSendParameters {
    pub encodings: Vec<RTCRtpCodingParameters>,
}

impl From<&TrackLocal> for RTCRtpSendParameters {
    fn from(track: &TrackLocal) -> Self {
        RTCRtpSendParameters {
            encodings: vec![RTCRtpCodingParameters {
                ssrc: track.ssrc,
                payload_type: track.payload_type,
            }],
        }
    }
}

/// RTCRtpSender writes the packets of a local track to the remote peer over the
/// SRTP session of its transport.
#[async_trait]
pub trait RTCRtpSender: Send + Sync {
    /// The track this sender transmits, if one is attached.
    fn track(&self) -> Option<TrackLocal>;

    /// send starts transmitting with the given parameters.
    async fn send(&self, params: RTCRtpSendParameters) -> Result<()>;

    /// stop irreversibly stops the sender.
    async fn stop(&self) -> Result<()>;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rtp_transceiver::rtp_codec::RtpCodecKind;

    #[test]
    fn test_send_parameters_from_track() {
        let track = TrackLocal::new(
            "audio".to_owned(),
            "stream".to_owned(),
            RtpCodecKind::Audio,
            5000,
            111,
        );

        assert_eq!(
            RTCRtpSendParameters::from(&track),
            RTCRtpSendParameters {
                encodings: vec![RTCRtpCodingParameters {
                    ssrc: 5000,
                    payload_type: 111,
                }],
            }
        );
    }
}
