mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::mpsc;

use common::*;
use rtc_peer::media_stream::track_local::TrackLocal;
use rtc_peer::media_stream::track_remote::TrackRemote;
use rtc_peer::peer_connection::configuration::sdp_semantics::RTCSdpSemantics;
use rtc_peer::peer_connection::configuration::{RTCConfiguration, RTCConfigurationBuilder};
use rtc_peer::peer_connection::transport::Transport;
use rtc_peer::peer_connection::transport::state::TransportState;
use rtc_peer::peer_connection::RTCPeerConnection;
use rtc_peer::rtp_transceiver::RTCRtpTransceiver;
use rtc_peer::rtp_transceiver::direction::RTCRtpTransceiverDirection;
use rtc_peer::rtp_transceiver::rtp_codec::RtpCodecKind;
use rtc_peer::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use shared::error::Error;

fn new_peer_connection(backend: &Arc<MockBackend>, configuration: RTCConfiguration) -> RTCPeerConnection {
    new_api(backend)
        .new_peer_connection(configuration)
        .expect("peer connection")
}

/// Forwards every track the connection reports to the returned channel.
async fn collect_tracks(pc: &RTCPeerConnection) -> mpsc::UnboundedReceiver<Arc<TrackRemote>> {
    let (track_tx, track_rx) = mpsc::unbounded_channel();
    pc.on_track(Box::new(
        move |track: Arc<TrackRemote>, _receiver: Arc<dyn RTCRtpReceiver>| {
            let _ = track_tx.send(track);
            Box::pin(async {})
        },
    ))
    .await;
    track_rx
}

async fn next_track(tracks: &mut mpsc::UnboundedReceiver<Arc<TrackRemote>>) -> Arc<TrackRemote> {
    tokio::time::timeout(TIMEOUT, tracks.recv())
        .await
        .expect("track")
        .expect("handler alive")
}

#[tokio::test]
async fn test_senders_start_by_direction() {
    init_log();

    let backend = Arc::new(MockBackend::default());
    let pc = new_peer_connection(&backend, RTCConfiguration::default());

    let audio_sender = MockSender::new(Some(TrackLocal::new(
        "audio-track".to_owned(),
        "stream".to_owned(),
        RtpCodecKind::Audio,
        5000,
        111,
    )));
    let video_sender = MockSender::new(Some(TrackLocal::new(
        "video-track".to_owned(),
        "stream".to_owned(),
        RtpCodecKind::Video,
        6000,
        96,
    )));
    let audio = RTCRtpTransceiver::new(
        RtpCodecKind::Audio,
        RTCRtpTransceiverDirection::Sendrecv,
        Some(Arc::clone(&audio_sender) as _),
        None,
    );
    audio.set_mid("0".to_owned()).await;
    let video = RTCRtpTransceiver::new(
        RtpCodecKind::Video,
        RTCRtpTransceiverDirection::Recvonly,
        Some(Arc::clone(&video_sender) as _),
        None,
    );
    video.set_mid("1".to_owned()).await;
    pc.add_media_transport(vec![audio, video])
        .await
        .expect("media transport");

    let sections = [("0", "audio", ""), ("1", "video", "")];
    negotiate(
        &pc,
        description("actpass", &sections),
        description("active", &sections),
    )
    .await;
    connect(&backend, 0).await;

    eventually("audio sender started", || {
        !audio_sender.sent.lock().unwrap().is_empty()
    })
    .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let sent = audio_sender.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].encodings.len(), 1);
    assert_eq!(sent[0].encodings[0].ssrc, 5000);
    assert_eq!(sent[0].encodings[0].payload_type, 111);
    assert!(video_sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_incoming_stream_binds_transceiver() {
    init_log();

    let backend = Arc::new(MockBackend::default());
    let pc = new_peer_connection(&backend, RTCConfiguration::default());
    let mut tracks = collect_tracks(&pc).await;

    let transceiver = pc
        .add_transceiver_from_kind(RtpCodecKind::Audio, RTCRtpTransceiverDirection::Recvonly)
        .await
        .expect("transceiver");
    transceiver.set_mid("0".to_owned()).await;
    pc.add_media_transport(vec![transceiver])
        .await
        .expect("media transport");

    negotiate(
        &pc,
        description(
            "actpass",
            &[("0", "audio", "a=ssrc:1111 cname:remote\r\na=ssrc:1111 msid:stream1 track1\r\n")],
        ),
        description("active", &[("0", "audio", "")]),
    )
    .await;
    connect(&backend, 0).await;

    let track = next_track(&mut tracks).await;
    assert_eq!(track.id().await, "track1");
    assert_eq!(track.stream_id().await, "stream1");
    assert_eq!(track.kind(), RtpCodecKind::Audio);
    assert_eq!(track.ssrc(), 1111);
    assert_eq!(track.payload_type(), 111);
    assert_eq!(track.codec().await.rtp_codec.mime_type, "audio/opus");

    let received = backend.receiver(0).received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].encodings[0].ssrc, 1111);
}

#[tokio::test]
async fn test_plan_b_streams_get_new_transceivers() {
    init_log();

    let backend = Arc::new(MockBackend::default());
    let configuration = RTCConfigurationBuilder::new()
        .with_sdp_semantics(RTCSdpSemantics::UnifiedPlanWithFallback)
        .build();
    let pc = new_peer_connection(&backend, configuration);
    let mut tracks = collect_tracks(&pc).await;

    let transceiver = pc
        .add_transceiver_from_kind(RtpCodecKind::Audio, RTCRtpTransceiverDirection::Sendrecv)
        .await
        .expect("transceiver");
    transceiver.set_mid("audio".to_owned()).await;
    let transport = pc
        .add_media_transport(vec![transceiver])
        .await
        .expect("media transport");

    negotiate(
        &pc,
        description(
            "actpass",
            &[(
                "audio",
                "audio",
                "a=ssrc:1111 cname:first\r\na=ssrc:2222 cname:second\r\n",
            )],
        ),
        description("active", &[("audio", "audio", "")]),
    )
    .await;
    connect(&backend, 0).await;

    let mut ssrcs = HashSet::new();
    ssrcs.insert(next_track(&mut tracks).await.ssrc());
    ssrcs.insert(next_track(&mut tracks).await.ssrc());
    assert_eq!(ssrcs, HashSet::from([1111, 2222]));

    assert_eq!(backend.receiver_count(), 2);
    assert_eq!(pc.get_transceivers().await.len(), 2);
    assert_eq!(transport.rtp_transceivers().await.len(), 2);
}

#[tokio::test]
async fn test_unified_plan_drops_unmatched_streams() {
    init_log();

    let backend = Arc::new(MockBackend::default());
    let pc = new_peer_connection(&backend, RTCConfiguration::default());
    let mut tracks = collect_tracks(&pc).await;

    let transceiver = pc
        .add_transceiver_from_kind(RtpCodecKind::Audio, RTCRtpTransceiverDirection::Sendrecv)
        .await
        .expect("transceiver");
    transceiver.set_mid("0".to_owned()).await;
    pc.add_media_transport(vec![transceiver])
        .await
        .expect("media transport");

    negotiate(
        &pc,
        description(
            "actpass",
            &[("0", "audio", "a=ssrc:1111 cname:first\r\na=ssrc:2222 cname:second\r\n")],
        ),
        description("active", &[("0", "audio", "")]),
    )
    .await;
    connect(&backend, 0).await;

    assert_eq!(next_track(&mut tracks).await.ssrc(), 1111);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(tracks.try_recv().is_err());
    assert_eq!(backend.receiver_count(), 1);
    assert_eq!(pc.get_transceivers().await.len(), 1);
}

#[tokio::test]
async fn test_write_rtcp() {
    init_log();

    let backend = Arc::new(MockBackend::default());
    let pc = new_peer_connection(&backend, RTCConfiguration::default());

    let pli: Vec<Box<dyn rtcp::packet::Packet + Send + Sync>> =
        vec![Box::new(rtcp::payload_feedbacks::picture_loss_indication::PictureLossIndication {
            sender_ssrc: 1,
            media_ssrc: 1111,
        })];

    let result = pc.write_rtcp(&pli).await;
    assert!(matches!(result, Err(Error::ErrNoMediaTransport)));

    let transceiver = pc
        .add_transceiver_from_kind(RtpCodecKind::Video, RTCRtpTransceiverDirection::Sendrecv)
        .await
        .expect("transceiver");
    transceiver.set_mid("0".to_owned()).await;
    let transport = pc
        .add_media_transport(vec![transceiver])
        .await
        .expect("media transport");

    let result = pc.write_rtcp(&pli).await;
    assert!(matches!(result, Err(Error::ErrSrtcpSessionNotReady)));

    negotiate(
        &pc,
        description("actpass", &[("0", "video", "")]),
        description("active", &[("0", "video", "")]),
    )
    .await;
    connect(&backend, 0).await;
    eventually("transport connected", || {
        transport.state() == TransportState::Connected
    })
    .await;

    let written = pc.write_rtcp(&pli).await.expect("write rtcp");
    assert_eq!(written, 12);
    let dtls_transport = backend.dtls_transport(0);
    assert_eq!(
        dtls_transport
            .srtcp_session
            .write_stream
            .written
            .lock()
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_application_transport_starts_sctp() {
    init_log();

    let backend = Arc::new(MockBackend::default());
    let pc = new_peer_connection(&backend, RTCConfiguration::default());
    let transport = pc
        .add_application_transport(Some("0".to_owned()))
        .await
        .expect("application transport");

    let (state_tx, mut state_rx) = mpsc::unbounded_channel();
    transport
        .on_state_change(Box::new(move |state: TransportState| {
            let _ = state_tx.send(state);
            Box::pin(async {})
        }))
        .await;

    negotiate(
        &pc,
        description(
            "actpass",
            &[("0", "application", "a=max-message-size:262144\r\n")],
        ),
        description("active", &[("0", "application", "")]),
    )
    .await;
    connect(&backend, 0).await;

    let mut states = vec![];
    while states.len() < 2 {
        let state = tokio::time::timeout(TIMEOUT, state_rx.recv())
            .await
            .expect("transport state")
            .expect("handler alive");
        states.push(state);
    }
    assert_eq!(
        states,
        vec![TransportState::Connecting, TransportState::Connected]
    );

    let sctp_transport = Arc::clone(&backend.sctp_transports.lock().unwrap()[0]);
    let started = sctp_transport.started.lock().unwrap().clone();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].max_message_size, 262144);

    pc.close().await.expect("close");
    eventually("SCTP stopped", || sctp_transport.stopped.load(Ordering::SeqCst)).await;
}

#[tokio::test]
async fn test_remote_candidates_routed_by_mid() {
    init_log();

    let backend = Arc::new(MockBackend::default());
    let pc = new_peer_connection(&backend, RTCConfiguration::default());
    pc.add_application_transport(Some("0".to_owned()))
        .await
        .expect("application transport");

    pc.add_ice_candidate("1", Some(host_candidate()))
        .await
        .expect("candidate for another mid");
    let ice_transport = backend.ice_transport(0);
    assert!(ice_transport.remote_candidates.lock().unwrap().is_empty());

    pc.add_ice_candidate("0", Some(host_candidate()))
        .await
        .expect("candidate");
    pc.add_ice_candidate("0", None)
        .await
        .expect("end of candidates");
    assert_eq!(
        *ice_transport.remote_candidates.lock().unwrap(),
        vec![Some(host_candidate()), None]
    );
}
