use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::dtls::{RTCDtlsTransport, SrtpSession};
use super::{Transport, TransportCore};
use crate::peer_connection::PeerConnectionInternal;
use crate::peer_connection::sdp::{
    TrackDetails, description_is_plan_b, get_mid_value, track_details_from_media,
};
use crate::rtp_transceiver::direction::RTCRtpTransceiverDirection;
use crate::rtp_transceiver::rtp_receiver::{RTCRtpReceiveParameters, RTCRtpReceiver};
use crate::rtp_transceiver::rtp_sender::RTCRtpSendParameters;
use crate::rtp_transceiver::{RTCRtpCodingParameters, RTCRtpTransceiver};
use shared::error::{Error, Result};

/// MediaTransport carries RTP and RTCP for a bundle of transceivers over
/// SRTP/SRTCP.
pub struct MediaTransport {
    core: TransportCore,
    rtp_transceivers: Mutex<Vec<Arc<RTCRtpTransceiver>>>,

    srtp_session: Mutex<Option<Arc<dyn SrtpSession>>>,
    srtcp_session: Mutex<Option<Arc<dyn SrtpSession>>>,
}

impl MediaTransport {
    pub(crate) fn new(core: TransportCore, rtp_transceivers: Vec<Arc<RTCRtpTransceiver>>) -> Self {
        MediaTransport {
            core,
            rtp_transceivers: Mutex::new(rtp_transceivers),
            srtp_session: Mutex::new(None),
            srtcp_session: Mutex::new(None),
        }
    }

    pub async fn rtp_transceivers(&self) -> Vec<Arc<RTCRtpTransceiver>> {
        self.rtp_transceivers.lock().await.clone()
    }

    /// write_rtcp sends a compound RTCP packet over the SRTCP session.
    pub async fn write_rtcp(
        &self,
        packets: &[Box<dyn rtcp::packet::Packet + Send + Sync>],
    ) -> Result<usize> {
        let srtcp_session = self
            .srtcp_session
            .lock()
            .await
            .clone()
            .ok_or(Error::ErrSrtcpSessionNotReady)?;

        let raw =
            rtcp::packet::marshal(packets).map_err(|e| Error::OtherRtcpErr(e.to_string()))?;
        let stream = srtcp_session.open_write_stream().await?;
        stream.write(&raw).await
    }

    async fn start_senders(&self) {
        for transceiver in self.rtp_transceivers().await {
            if !transceiver.direction().has_send() || transceiver.stopped() {
                continue;
            }
            let Some(sender) = transceiver.sender().await else {
                continue;
            };
            let Some(track) = sender.track() else {
                continue;
            };

            if let Err(err) = sender.send(RTCRtpSendParameters::from(&track)).await {
                log::warn!("{}: failed to start sender for {}: {}", self.core.id, track.id, err);
            }
        }
    }

    /// The streams the remote description advertises for this transport.
    async fn remote_track_details(&self, pc: &PeerConnectionInternal) -> (Vec<TrackDetails>, bool) {
        let mids = self.get_mids().await;

        let descriptions = pc.descriptions.lock().await;
        let Some(remote) = descriptions.remote_session() else {
            log::warn!("{}: no remote description, skipping stream matching", self.core.id);
            return (vec![], false);
        };

        let sections: Vec<_> = remote
            .media_descriptions
            .iter()
            .filter(|m| get_mid_value(m).is_some_and(|mid| mids.iter().any(|m| m == mid)))
            .collect();
        let details = if sections.is_empty() {
            track_details_from_media(&remote.media_descriptions)
        } else {
            track_details_from_media(sections)
        };

        (details, description_is_plan_b(remote))
    }

    /// Binds every advertised inbound stream to a transceiver able to receive
    /// it. Unmatched streams get a new transceiver only when the SDP semantics
    /// accept them.
    async fn start_receivers(&self, pc: &Arc<PeerConnectionInternal>) -> Result<()> {
        let dtls_transport = self.core.dtls_transport()?;
        let (incoming, remote_is_plan_b) = self.remote_track_details(pc).await;
        let transceivers = pc.rtp_transceivers.lock().await.clone();

        let mut unhandled = vec![];
        for details in incoming {
            let mut matched = None;
            for transceiver in &transceivers {
                if transceiver.kind() != details.kind
                    || !transceiver.direction().has_recv()
                    || transceiver.stopped()
                {
                    continue;
                }
                let Some(receiver) = transceiver.receiver().await else {
                    continue;
                };
                if transceiver.claim_receiver() {
                    matched = Some(receiver);
                    break;
                }
            }

            match matched {
                Some(receiver) => {
                    start_receiver(Arc::clone(pc), Arc::clone(&dtls_transport), receiver, details)
                }
                None => unhandled.push(details),
            }
        }

        if unhandled.is_empty() {
            return Ok(());
        }
        if !pc
            .configuration
            .sdp_semantics
            .accepts_unmatched_streams(remote_is_plan_b)
        {
            for details in unhandled {
                log::debug!(
                    "{}: no transceiver for incoming SSRC {}, dropping it",
                    self.core.id,
                    details.ssrc
                );
            }
            return Ok(());
        }

        for details in unhandled {
            let receiver = pc.backend.new_rtp_receiver(details.kind);
            let transceiver = RTCRtpTransceiver::new(
                details.kind,
                RTCRtpTransceiverDirection::Sendrecv,
                None,
                Some(Arc::clone(&receiver)),
            );
            transceiver.claim_receiver();
            log::debug!(
                "{}: created {} transceiver for incoming SSRC {}",
                self.core.id,
                details.kind,
                details.ssrc
            );

            pc.rtp_transceivers.lock().await.push(Arc::clone(&transceiver));
            self.rtp_transceivers.lock().await.push(transceiver);
            start_receiver(Arc::clone(pc), Arc::clone(&dtls_transport), receiver, details);
        }

        Ok(())
    }
}

/// Starts `receiver` on the stream of `details` and hands its track to the
/// on_track handler once the first packet told its payload type.
fn start_receiver(
    pc: Arc<PeerConnectionInternal>,
    dtls_transport: Arc<dyn RTCDtlsTransport>,
    receiver: Arc<dyn RTCRtpReceiver>,
    details: TrackDetails,
) {
    tokio::spawn(async move {
        if let Err(err) = bind_receiver(&pc, dtls_transport, &receiver, &details).await {
            log::warn!("failed to start receiver for SSRC {}: {}", details.ssrc, err);
        }
    });
}

async fn bind_receiver(
    pc: &Arc<PeerConnectionInternal>,
    dtls_transport: Arc<dyn RTCDtlsTransport>,
    receiver: &Arc<dyn RTCRtpReceiver>,
    details: &TrackDetails,
) -> Result<()> {
    receiver
        .receive(
            dtls_transport,
            RTCRtpReceiveParameters {
                encodings: vec![RTCRtpCodingParameters {
                    ssrc: details.ssrc,
                    ..Default::default()
                }],
            },
        )
        .await?;

    let payload_type = receiver.determine_payload_type().await?;
    let track = receiver.track();
    track.set_ssrc(details.ssrc);
    track.set_payload_type(payload_type);

    let codec = {
        let descriptions = pc.descriptions.lock().await;
        let local = descriptions
            .local_session()
            .ok_or(Error::ErrNoLocalDescription)?;
        local
            .get_codec_for_payload_type(payload_type)
            .map_err(|e| Error::OtherSdpErr(e.to_string()))?
    };
    let params =
        pc.media_engine
            .get_codec_by_sdp(details.kind, &codec.name, codec.clock_rate, payload_type)?;

    track
        .bind(
            details.id.clone(),
            details.label.clone(),
            details.kind,
            params,
        )
        .await;

    log::debug!(
        "receiver for SSRC {} bound to track {} of stream {}",
        details.ssrc,
        details.id,
        details.label
    );
    pc.do_track(track, Arc::clone(receiver)).await;

    Ok(())
}

/// Accepts and discards the streams of `session` nothing has opened, until the
/// session fails.
fn drain_unhandled_streams(name: &'static str, session: Arc<dyn SrtpSession>) {
    tokio::spawn(async move {
        loop {
            match session.accept_stream().await {
                Ok(stream) => log::debug!("discarding unhandled {} stream {}", name, stream.ssrc()),
                Err(err) => {
                    log::debug!("stopped accepting {name} streams: {err}");
                    break;
                }
            }
        }
    });
}

#[async_trait]
impl Transport for MediaTransport {
    fn core(&self) -> &TransportCore {
        &self.core
    }

    async fn get_mids(&self) -> Vec<String> {
        let mut mids = vec![];
        for transceiver in self.rtp_transceivers().await {
            if let Some(mid) = transceiver.mid().await {
                mids.push(mid);
            }
        }
        mids
    }

    async fn start_secure_session(&self) -> Result<()> {
        let dtls_transport = self.core.dtls_transport()?;
        let srtp_session = dtls_transport
            .srtp_session()
            .await
            .ok_or(Error::ErrSrtpSessionNotReady)?;
        let srtcp_session = dtls_transport
            .srtcp_session()
            .await
            .ok_or(Error::ErrSrtcpSessionNotReady)?;

        *self.srtp_session.lock().await = Some(Arc::clone(&srtp_session));
        *self.srtcp_session.lock().await = Some(Arc::clone(&srtcp_session));

        self.start_senders().await;

        let pc = self.core.peer_connection()?;
        self.start_receivers(&pc).await?;

        drain_unhandled_streams("SRTP", srtp_session);
        drain_unhandled_streams("SRTCP", srtcp_session);

        Ok(())
    }

    async fn stop_secure_session(&self) -> Result<()> {
        self.srtp_session.lock().await.take();
        self.srtcp_session.lock().await.take();
        Ok(())
    }
}
