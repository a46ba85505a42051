use super::{MediaStreamId, MediaStreamTrackId};
use crate::rtp_transceiver::rtp_codec::{PayloadType, RtpCodecKind, SSRC};

/// TrackLocal describes the outbound stream a sender writes once the secure
/// session is up: the SSRC and payload type its packets carry.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TrackLocal {
    pub id: MediaStreamTrackId,
    pub stream_id: MediaStreamId,
    pub kind: RtpCodecKind,
    pub ssrc: SSRC,
    pub payload_type: PayloadType,
}

impl TrackLocal {
    pub fn new(
        id: MediaStreamTrackId,
        stream_id: MediaStreamId,
        kind: RtpCodecKind,
        ssrc: SSRC,
        payload_type: PayloadType,
    ) -> Self {
        TrackLocal {
            id,
            stream_id,
            kind,
            ssrc,
            payload_type,
        }
    }
}
