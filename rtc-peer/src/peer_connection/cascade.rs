//! How the dispatch loop reacts to state changes: aggregating the states of
//! every transport into the states of the connection, and starting the next
//! phase of connection establishment once the previous one completed.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::PeerConnectionInternal;
use super::dispatch::EventDispatcher;
use super::state::ice_connection_state::aggregate_ice_connection_state;
use super::state::ice_gathering_state::{RTCIceGatheringState, next_ice_gathering_state};
use super::state::peer_connection_state::aggregate_peer_connection_state;
use super::state::signaling_state::RTCSignalingState;

impl EventDispatcher {
    pub(super) async fn handle_ice_gathering_transition(
        &mut self,
        pc: &Arc<PeerConnectionInternal>,
        proposed: RTCIceGatheringState,
    ) {
        let next = match next_ice_gathering_state(
            self.ice_gathering_state,
            proposed,
            self.gathering_states.values(),
        ) {
            Ok(Some(next)) => next,
            Ok(None) => {
                log::trace!(
                    "ICE gathering state stays {} on {}",
                    self.ice_gathering_state,
                    proposed
                );
                return;
            }
            Err(err) => {
                log::warn!(
                    "rejected ICE gathering transition {} -> {}: {}",
                    self.ice_gathering_state,
                    proposed,
                    err
                );
                return;
            }
        };

        self.ice_gathering_state = next;
        pc.do_ice_gathering_state_change(next);

        if next == RTCIceGatheringState::Complete {
            pc.do_ice_candidate(None);
            connect_transports(pc).await;
        }
    }

    pub(super) async fn handle_ice_state_transition(&mut self, pc: &Arc<PeerConnectionInternal>) {
        let ice_connection_state = aggregate_ice_connection_state(self.ice_states.values());
        if ice_connection_state != self.ice_connection_state {
            self.ice_connection_state = ice_connection_state;
            pc.do_ice_connection_state_change(ice_connection_state);
        }

        self.update_peer_connection_state(pc).await;
    }

    pub(super) async fn handle_dtls_state_transition(&mut self, pc: &Arc<PeerConnectionInternal>) {
        self.update_peer_connection_state(pc).await;
    }

    async fn update_peer_connection_state(&mut self, pc: &Arc<PeerConnectionInternal>) {
        // a closed connection stays closed whatever its transports report
        if pc.is_closed.load(Ordering::SeqCst) {
            return;
        }

        let peer_connection_state =
            aggregate_peer_connection_state(self.ice_states.values(), self.dtls_states.values());
        if peer_connection_state != self.peer_connection_state {
            self.peer_connection_state = peer_connection_state;
            pc.do_peer_connection_state_change(peer_connection_state);
        }
    }

    pub(super) async fn handle_signaling_state(
        &mut self,
        pc: &Arc<PeerConnectionInternal>,
        state: RTCSignalingState,
    ) {
        self.signaling_state = state;
        pc.do_signaling_state_change(state);

        if state == RTCSignalingState::Stable {
            for transport in pc.transports.lock().await.iter() {
                transport.gather_ice_candidates();
            }
        }
    }
}

/// Connects every transport of `pc` off the dispatch loop: connecting reports
/// back to the loop, which must stay free to receive it.
async fn connect_transports(pc: &Arc<PeerConnectionInternal>) {
    let transports = pc.transports.lock().await.clone();
    tokio::spawn(async move {
        for transport in transports {
            transport.connect().await;
        }
    });
}
