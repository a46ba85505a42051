use std::sync::Weak;

use tokio::sync::mpsc;

use super::PeerConnectionInternal;
use super::state::ice_connection_state::RTCIceConnectionState;
use super::state::ice_gathering_state::RTCIceGatheringState;
use super::state::peer_connection_state::RTCPeerConnectionState;
use super::state::signaling_state::RTCSignalingState;
use super::transport::ice::candidate::RTCIceCandidate;

/// A change the application is told about, queued by the dispatch loop.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notification {
    IceCandidate(Option<RTCIceCandidate>),
    IceGatheringState(RTCIceGatheringState),
    IceConnectionState(RTCIceConnectionState),
    PeerConnectionState(RTCPeerConnectionState),
    SignalingState(RTCSignalingState),
}

/// Runs the application handlers for `notifications`, one at a time and in
/// the order the dispatch loop queued them. Handlers may call back into the
/// connection: the loop never waits for them.
pub(crate) async fn run_notifier(
    pc: Weak<PeerConnectionInternal>,
    mut notifications: mpsc::UnboundedReceiver<Notification>,
) {
    while let Some(notification) = notifications.recv().await {
        let Some(pc) = pc.upgrade() else {
            break;
        };
        pc.deliver(notification).await;
    }

    log::debug!("notifier terminated");
}
