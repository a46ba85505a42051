use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use tokio::sync::Mutex;

use super::{MediaStreamId, MediaStreamTrackId};
use crate::rtp_transceiver::rtp_codec::{PayloadType, RTCRtpCodecParameters, RtpCodecKind, SSRC};

#[derive(Default, Debug)]
struct TrackRemoteDetails {
    id: MediaStreamTrackId,
    stream_id: MediaStreamId,
    codec: RTCRtpCodecParameters,
}

/// TrackRemote represents a single inbound source of media.
///
/// A receiver owns its track; the connection fills in what it learns about the
/// stream, from the remote description and the first packets, before handing
/// the track to the on_track handler.
#[derive(Default, Debug)]
pub struct TrackRemote {
    kind: AtomicU8,
    ssrc: AtomicU32,
    payload_type: AtomicU8,
    details: Mutex<TrackRemoteDetails>,
}

impl TrackRemote {
    pub fn new(kind: RtpCodecKind) -> Self {
        TrackRemote {
            kind: AtomicU8::new(kind as u8),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> RtpCodecKind {
        self.kind.load(Ordering::SeqCst).into()
    }

    pub fn ssrc(&self) -> SSRC {
        self.ssrc.load(Ordering::SeqCst)
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload_type.load(Ordering::SeqCst)
    }

    /// id is the track id of the `msid` the stream was advertised with,
    /// empty when it was not.
    pub async fn id(&self) -> MediaStreamTrackId {
        self.details.lock().await.id.clone()
    }

    /// stream_id is the label of the `msid` the stream was advertised with.
    pub async fn stream_id(&self) -> MediaStreamId {
        self.details.lock().await.stream_id.clone()
    }

    pub async fn codec(&self) -> RTCRtpCodecParameters {
        self.details.lock().await.codec.clone()
    }

    pub(crate) fn set_ssrc(&self, ssrc: SSRC) {
        self.ssrc.store(ssrc, Ordering::SeqCst);
    }

    pub(crate) fn set_payload_type(&self, payload_type: PayloadType) {
        self.payload_type.store(payload_type, Ordering::SeqCst);
    }

    pub(crate) async fn bind(
        &self,
        id: MediaStreamTrackId,
        stream_id: MediaStreamId,
        kind: RtpCodecKind,
        codec: RTCRtpCodecParameters,
    ) {
        let mut details = self.details.lock().await;
        details.id = id;
        details.stream_id = stream_id;
        details.codec = codec;
        self.kind.store(kind as u8, Ordering::SeqCst);
    }
}
