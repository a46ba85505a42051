pub mod direction;
pub mod rtp_codec;
pub mod rtp_receiver;
pub mod rtp_sender;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use sdp::description::session::SessionDescription;
use tokio::sync::Mutex;

use crate::peer_connection::sdp::{ATTR_KEY_SETUP, attribute_with_fallback, bundle_mids, get_by_mid};
use crate::peer_connection::transport::dtls::role::{RTCDtlsRole, negotiate_dtls_role};
use direction::RTCRtpTransceiverDirection;
use rtp_codec::{PayloadType, RtpCodecKind, SSRC};
use rtp_receiver::RTCRtpReceiver;
use rtp_sender::RTCRtpSender;
use shared::error::{Error, Result};

/// RTCRtpCodingParameters provides information relating to both encoding and decoding.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct RTCRtpCodingParameters {
    pub ssrc: SSRC,
    pub payload_type: PayloadType,
}

/// What one side of the negotiation declared for a media section.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct DeclaredNegotiation {
    pub(crate) dtls_role: RTCDtlsRole,
    pub(crate) bundled: bool,
}

impl DeclaredNegotiation {
    /// Reads the `setup` attribute (session level fallback) and BUNDLE membership
    /// of the media section `mid` in `desc`.
    pub(crate) fn from_description(desc: &SessionDescription, mid: &str) -> Option<Self> {
        let media = get_by_mid(mid, desc)?;
        Some(DeclaredNegotiation {
            dtls_role: RTCDtlsRole::from_setup(
                attribute_with_fallback(Some(media), desc, ATTR_KEY_SETUP).flatten(),
            ),
            bundled: bundle_mids(desc).iter().any(|m| m == mid),
        })
    }
}

/// Bundling and DTLS role bookkeeping of a transceiver.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct TransceiverNegotiation {
    pub(crate) local: DeclaredNegotiation,
    pub(crate) remote: DeclaredNegotiation,
    /// bundling agreed by both sides
    pub(crate) bundled: bool,
    /// role agreed for the local side, Auto until either side is explicit
    pub(crate) dtls_role: RTCDtlsRole,
}

impl TransceiverNegotiation {
    fn resolve(&mut self) {
        self.bundled = self.local.bundled && self.remote.bundled;
        self.dtls_role = negotiate_dtls_role(self.local.dtls_role, self.remote.dtls_role);
    }
}

/// RTCRtpTransceiver represents a combination of an RTCRtpSender and an
/// RTCRtpReceiver that share a common mid.
pub struct RTCRtpTransceiver {
    kind: RtpCodecKind,
    direction: AtomicU8,
    mid: Mutex<Option<String>>,

    sender: Mutex<Option<Arc<dyn RTCRtpSender>>>,
    receiver: Mutex<Option<Arc<dyn RTCRtpReceiver>>>,

    negotiation: Mutex<TransceiverNegotiation>,

    /// set once the receiver was bound to an inbound stream
    receiving: AtomicBool,
    stopped: AtomicBool,
}

impl fmt::Debug for RTCRtpTransceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTCRtpTransceiver")
            .field("kind", &self.kind)
            .field("direction", &self.direction())
            .field("stopped", &self.stopped())
            .finish()
    }
}

impl RTCRtpTransceiver {
    pub fn new(
        kind: RtpCodecKind,
        direction: RTCRtpTransceiverDirection,
        sender: Option<Arc<dyn RTCRtpSender>>,
        receiver: Option<Arc<dyn RTCRtpReceiver>>,
    ) -> Arc<Self> {
        Arc::new(RTCRtpTransceiver {
            kind,
            direction: AtomicU8::new(direction as u8),
            mid: Mutex::new(None),
            sender: Mutex::new(sender),
            receiver: Mutex::new(receiver),
            negotiation: Mutex::new(TransceiverNegotiation::default()),
            receiving: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn kind(&self) -> RtpCodecKind {
        self.kind
    }

    pub fn direction(&self) -> RTCRtpTransceiverDirection {
        self.direction.load(Ordering::SeqCst).into()
    }

    pub(crate) fn set_direction(&self, direction: RTCRtpTransceiverDirection) {
        self.direction.store(direction as u8, Ordering::SeqCst);
    }

    pub async fn mid(&self) -> Option<String> {
        self.mid.lock().await.clone()
    }

    pub async fn set_mid(&self, mid: String) {
        *self.mid.lock().await = Some(mid);
    }

    pub async fn sender(&self) -> Option<Arc<dyn RTCRtpSender>> {
        self.sender.lock().await.clone()
    }

    pub async fn receiver(&self) -> Option<Arc<dyn RTCRtpReceiver>> {
        self.receiver.lock().await.clone()
    }

    /// set_sending_track attaches `sender` and turns the transceiver into a
    /// sending one: recvonly becomes sendrecv, inactive becomes sendonly.
    pub async fn set_sending_track(&self, sender: Arc<dyn RTCRtpSender>) -> Result<()> {
        let direction = self
            .direction()
            .with_sending()
            .ok_or(Error::ErrRTPTransceiverSetSendingInvalidState)?;

        *self.sender.lock().await = Some(sender);
        self.set_direction(direction);
        Ok(())
    }

    /// stop irreversibly stops the transceiver: the sender first, then the
    /// receiver. The first failure is returned and the rest is skipped.
    pub async fn stop(&self) -> Result<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Some(sender) = self.sender().await {
            sender.stop().await?;
        }
        if let Some(receiver) = self.receiver().await {
            receiver.stop().await?;
        }

        Ok(())
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Whether bundling was agreed by both sides.
    pub async fn bundled(&self) -> bool {
        self.negotiation.lock().await.bundled
    }

    /// The DTLS role agreed for the local side, Auto when left to the ICE role.
    pub async fn dtls_role(&self) -> RTCDtlsRole {
        self.negotiation.lock().await.dtls_role
    }

    pub(crate) async fn set_local_negotiation(&self, declared: DeclaredNegotiation) {
        let mut negotiation = self.negotiation.lock().await;
        negotiation.local = declared;
        negotiation.resolve();
    }

    pub(crate) async fn set_remote_negotiation(&self, declared: DeclaredNegotiation) {
        let mut negotiation = self.negotiation.lock().await;
        negotiation.remote = declared;
        negotiation.resolve();
    }

    /// Claims the receiver for an inbound stream. Only the first claim succeeds.
    pub(crate) fn claim_receiver(&self) -> bool {
        !self.receiving.swap(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;

    use super::*;
    use crate::media_stream::track_local::TrackLocal;
    use crate::media_stream::track_remote::TrackRemote;
    use crate::peer_connection::transport::dtls::RTCDtlsTransport;
    use rtp_receiver::RTCRtpReceiveParameters;
    use rtp_sender::RTCRtpSendParameters;

    struct StopRecorder {
        calls: Arc<AtomicUsize>,
        result: Result<()>,
    }

    #[async_trait]
    impl RTCRtpSender for StopRecorder {
        fn track(&self) -> Option<TrackLocal> {
            None
        }

        async fn send(&self, _params: RTCRtpSendParameters) -> Result<()> {
            Ok(())
        }

        async fn stop(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[async_trait]
    impl RTCRtpReceiver for StopRecorder {
        fn kind(&self) -> RtpCodecKind {
            RtpCodecKind::Audio
        }

        fn track(&self) -> Arc<TrackRemote> {
            Arc::new(TrackRemote::new(RtpCodecKind::Audio))
        }

        async fn receive(
            &self,
            _transport: Arc<dyn RTCDtlsTransport>,
            _params: RTCRtpReceiveParameters,
        ) -> Result<()> {
            Ok(())
        }

        async fn determine_payload_type(&self) -> Result<PayloadType> {
            Ok(0)
        }

        async fn stop(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_rtp_transceiver_stop() {
        let tests = vec![
            ("both succeed", Ok(()), Ok(()), Ok(()), 1, 1),
            (
                "sender fails",
                Err(Error::ErrTrackNotExisted),
                Ok(()),
                Err(Error::ErrTrackNotExisted),
                1,
                0,
            ),
            (
                "receiver fails",
                Ok(()),
                Err(Error::ErrConnectionClosed),
                Err(Error::ErrConnectionClosed),
                1,
                1,
            ),
        ];

        for (name, sender_result, receiver_result, expected, sender_calls, receiver_calls) in tests
        {
            let sender_count = Arc::new(AtomicUsize::new(0));
            let receiver_count = Arc::new(AtomicUsize::new(0));
            let transceiver = RTCRtpTransceiver::new(
                RtpCodecKind::Audio,
                RTCRtpTransceiverDirection::Sendrecv,
                Some(Arc::new(StopRecorder {
                    calls: Arc::clone(&sender_count),
                    result: sender_result,
                })),
                Some(Arc::new(StopRecorder {
                    calls: Arc::clone(&receiver_count),
                    result: receiver_result,
                })),
            );

            assert_eq!(transceiver.stop().await, expected, "{name}");
            assert!(transceiver.stopped(), "{name}");
            assert_eq!(sender_count.load(Ordering::SeqCst), sender_calls, "{name}");
            assert_eq!(receiver_count.load(Ordering::SeqCst), receiver_calls, "{name}");

            // irreversible, a second stop does nothing
            assert_eq!(transceiver.stop().await, Ok(()), "{name}");
            assert_eq!(sender_count.load(Ordering::SeqCst), sender_calls, "{name}");
        }
    }

    #[tokio::test]
    async fn test_rtp_transceiver_set_sending_track() {
        use RTCRtpTransceiverDirection as D;

        let tests = vec![
            (D::Recvonly, Ok(D::Sendrecv)),
            (D::Inactive, Ok(D::Sendonly)),
            (D::Sendrecv, Err(Error::ErrRTPTransceiverSetSendingInvalidState)),
            (D::Sendonly, Err(Error::ErrRTPTransceiverSetSendingInvalidState)),
        ];

        for (direction, expected) in tests {
            let transceiver = RTCRtpTransceiver::new(RtpCodecKind::Video, direction, None, None);
            let sender: Arc<dyn RTCRtpSender> = Arc::new(StopRecorder {
                calls: Arc::new(AtomicUsize::new(0)),
                result: Ok(()),
            });

            let result = transceiver.set_sending_track(sender).await;
            match expected {
                Ok(next) => {
                    assert_eq!(result, Ok(()), "{direction}");
                    assert_eq!(transceiver.direction(), next, "{direction}");
                    assert!(transceiver.sender().await.is_some(), "{direction}");
                }
                Err(err) => {
                    assert_eq!(result, Err(err), "{direction}");
                    assert_eq!(transceiver.direction(), direction, "{direction}");
                    assert!(transceiver.sender().await.is_none(), "{direction}");
                }
            }
        }
    }

    #[tokio::test]
    async fn test_rtp_transceiver_negotiation() {
        let offer = "v=0\r\n\
o=- 4596489990601351948 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE 0 1\r\n\
a=setup:actpass\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:0\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:1\r\n";
        let answer = "v=0\r\n\
o=- 4596489990601351948 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE 0\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:0\r\n\
a=setup:active\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:1\r\n";
        let parse = |sdp: &str| {
            let mut reader = Cursor::new(sdp.as_bytes());
            SessionDescription::unmarshal(&mut reader).expect("valid sdp")
        };
        let (offer, answer) = (parse(offer), parse(answer));

        let tests = vec![
            ("0", true, RTCDtlsRole::Server),
            ("1", false, RTCDtlsRole::Auto),
        ];

        for (mid, bundled, dtls_role) in tests {
            let transceiver = RTCRtpTransceiver::new(
                RtpCodecKind::Audio,
                RTCRtpTransceiverDirection::Sendrecv,
                None,
                None,
            );
            transceiver
                .set_local_negotiation(
                    DeclaredNegotiation::from_description(&offer, mid).expect("local section"),
                )
                .await;
            assert_eq!(transceiver.dtls_role().await, RTCDtlsRole::Auto, "mid {mid}");
            assert!(!transceiver.bundled().await, "mid {mid}");

            transceiver
                .set_remote_negotiation(
                    DeclaredNegotiation::from_description(&answer, mid).expect("remote section"),
                )
                .await;
            assert_eq!(transceiver.bundled().await, bundled, "mid {mid}");
            assert_eq!(transceiver.dtls_role().await, dtls_role, "mid {mid}");
        }

        assert!(DeclaredNegotiation::from_description(&offer, "7").is_none());
    }

    #[test]
    fn test_rtp_transceiver_claim_receiver() {
        let transceiver = RTCRtpTransceiver::new(
            RtpCodecKind::Audio,
            RTCRtpTransceiverDirection::Recvonly,
            None,
            None,
        );
        assert!(transceiver.claim_receiver());
        assert!(!transceiver.claim_receiver());
    }
}
