//! Codec registry used to resolve the codec of inbound tracks.

use crate::rtp_transceiver::rtp_codec::{RTCRtpCodec, RTCRtpCodecParameters, RtpCodecKind};
use shared::error::{Error, Result};

pub const MIME_TYPE_H264: &str = "video/H264";
pub const MIME_TYPE_OPUS: &str = "audio/opus";
pub const MIME_TYPE_VP8: &str = "video/VP8";
pub const MIME_TYPE_VP9: &str = "video/VP9";
pub const MIME_TYPE_G722: &str = "audio/G722";
pub const MIME_TYPE_PCMU: &str = "audio/PCMU";
pub const MIME_TYPE_PCMA: &str = "audio/PCMA";

/// MediaEngine defines the codecs supported by a peer connection.
/// A MediaEngine must not be shared between peer connections once they
/// started negotiating.
#[derive(Default, Clone, Debug)]
pub struct MediaEngine {
    pub(crate) audio_codecs: Vec<RTCRtpCodecParameters>,
    pub(crate) video_codecs: Vec<RTCRtpCodecParameters>,
}

impl MediaEngine {
    /// register_default_codecs registers the codecs every browser is expected
    /// to understand.
    pub fn register_default_codecs(&mut self) -> Result<()> {
        let audio_codecs = vec![
            (MIME_TYPE_OPUS, 48000, 2, "minptime=10;useinbandfec=1", 111),
            (MIME_TYPE_G722, 8000, 0, "", 9),
            (MIME_TYPE_PCMU, 8000, 0, "", 0),
            (MIME_TYPE_PCMA, 8000, 0, "", 8),
        ];
        for (mime_type, clock_rate, channels, sdp_fmtp_line, payload_type) in audio_codecs {
            self.register_codec(
                codec(mime_type, clock_rate, channels, sdp_fmtp_line, payload_type),
                RtpCodecKind::Audio,
            )?;
        }

        let video_codecs = vec![
            (MIME_TYPE_VP8, 90000, 0, "", 96),
            (MIME_TYPE_VP9, 90000, 0, "profile-id=0", 98),
            (
                MIME_TYPE_H264,
                90000,
                0,
                "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42001f",
                102,
            ),
        ];
        for (mime_type, clock_rate, channels, sdp_fmtp_line, payload_type) in video_codecs {
            self.register_codec(
                codec(mime_type, clock_rate, channels, sdp_fmtp_line, payload_type),
                RtpCodecKind::Video,
            )?;
        }

        Ok(())
    }

    /// register_codec adds codec to the MediaEngine. A codec already registered
    /// with the same payload type is replaced.
    pub fn register_codec(&mut self, codec: RTCRtpCodecParameters, kind: RtpCodecKind) -> Result<()> {
        let codecs = match kind {
            RtpCodecKind::Audio => &mut self.audio_codecs,
            RtpCodecKind::Video => &mut self.video_codecs,
            RtpCodecKind::Unspecified => return Err(Error::ErrUnknownType),
        };

        codecs.retain(|c| c.payload_type != codec.payload_type);
        codecs.push(codec);

        Ok(())
    }

    pub(crate) fn get_codecs_by_kind(&self, kind: RtpCodecKind) -> &[RTCRtpCodecParameters] {
        match kind {
            RtpCodecKind::Audio => &self.audio_codecs,
            RtpCodecKind::Video => &self.video_codecs,
            RtpCodecKind::Unspecified => &[],
        }
    }

    /// Looks up the registered codec an SDP rtpmap entry names. The payload
    /// type of the result is the negotiated one, not the registered one.
    pub(crate) fn get_codec_by_sdp(
        &self,
        kind: RtpCodecKind,
        name: &str,
        clock_rate: u32,
        payload_type: u8,
    ) -> Result<RTCRtpCodecParameters> {
        self.get_codecs_by_kind(kind)
            .iter()
            .find(|c| c.matches_sdp(kind, name, clock_rate))
            .map(|c| RTCRtpCodecParameters {
                rtp_codec: c.rtp_codec.clone(),
                payload_type,
            })
            .ok_or(Error::ErrCodecNotFound)
    }
}

fn codec(
    mime_type: &str,
    clock_rate: u32,
    channels: u16,
    sdp_fmtp_line: &str,
    payload_type: u8,
) -> RTCRtpCodecParameters {
    RTCRtpCodecParameters {
        rtp_codec: RTCRtpCodec {
            mime_type: mime_type.to_owned(),
            clock_rate,
            channels,
            sdp_fmtp_line: sdp_fmtp_line.to_owned(),
        },
        payload_type,
    }
}
