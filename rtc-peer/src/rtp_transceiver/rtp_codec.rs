use std::fmt;

use serde::{Deserialize, Serialize};

use crate::peer_connection::configuration::UNSPECIFIED_STR;

/// PayloadType identifies the format of the RTP payload.
pub type PayloadType = u8;

/// SSRC represents a synchronization source.
pub type SSRC = u32;

/// RtpCodecKind determines the kind of a codec, and of the media it carries.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RtpCodecKind {
    #[default]
    Unspecified = 0,

    #[serde(rename = "audio")]
    Audio = 1,

    #[serde(rename = "video")]
    Video = 2,
}

const RTP_CODEC_KIND_AUDIO_STR: &str = "audio";
const RTP_CODEC_KIND_VIDEO_STR: &str = "video";

impl From<&str> for RtpCodecKind {
    fn from(raw: &str) -> Self {
        match raw {
            RTP_CODEC_KIND_AUDIO_STR => RtpCodecKind::Audio,
            RTP_CODEC_KIND_VIDEO_STR => RtpCodecKind::Video,
            _ => RtpCodecKind::Unspecified,
        }
    }
}

impl From<u8> for RtpCodecKind {
    fn from(v: u8) -> Self {
        match v {
            1 => RtpCodecKind::Audio,
            2 => RtpCodecKind::Video,
            _ => RtpCodecKind::Unspecified,
        }
    }
}

impl fmt::Display for RtpCodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RtpCodecKind::Audio => RTP_CODEC_KIND_AUDIO_STR,
            RtpCodecKind::Video => RTP_CODEC_KIND_VIDEO_STR,
            RtpCodecKind::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

/// RTCRtpCodec represents a codec supported by the media engine.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCRtpCodec {
    /// MIME type of the codec, e.g. "video/VP8" or "audio/opus"
    pub mime_type: String,
    pub clock_rate: u32,
    /// 0 for video codecs
    pub channels: u16,
    pub sdp_fmtp_line: String,
}

/// RTCRtpCodecParameters is a codec bound to the payload type it was
/// negotiated with.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCRtpCodecParameters {
    pub rtp_codec: RTCRtpCodec,
    pub payload_type: PayloadType,
}

impl RTCRtpCodecParameters {
    /// Reports whether this codec is the one an SDP rtpmap line names, e.g.
    /// `opus/48000` in an audio section. The mime comparison ignores case.
    pub(crate) fn matches_sdp(&self, kind: RtpCodecKind, name: &str, clock_rate: u32) -> bool {
        let mime_type = format!("{kind}/{name}");
        self.rtp_codec.mime_type.eq_ignore_ascii_case(&mime_type)
            && self.rtp_codec.clock_rate == clock_rate
    }
}
