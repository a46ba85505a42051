use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;

use super::PeerConnectionInternal;
use super::event::RTCEventInternal;
use super::state::ice_connection_state::RTCIceConnectionState;
use super::state::ice_gathering_state::RTCIceGatheringState;
use super::state::peer_connection_state::RTCPeerConnectionState;
use super::state::signaling_state::RTCSignalingState;
use super::transport::TransportId;
use super::transport::dtls::state::RTCDtlsTransportState;
use super::transport::ice::state::RTCIceTransportState;
use super::transport::state::TransportState;

/// EventDispatcher is the single consumer of the events of a connection and
/// the only writer of its states. The per-transport maps live here and nowhere
/// else; the connection handle only sees the mirrors it publishes.
pub(crate) struct EventDispatcher {
    pc: Weak<PeerConnectionInternal>,

    pub(super) ice_states: HashMap<TransportId, RTCIceTransportState>,
    pub(super) dtls_states: HashMap<TransportId, RTCDtlsTransportState>,
    pub(super) gathering_states: HashMap<TransportId, RTCIceGatheringState>,
    pub(super) transport_states: HashMap<TransportId, TransportState>,

    pub(super) ice_gathering_state: RTCIceGatheringState,
    pub(super) ice_connection_state: RTCIceConnectionState,
    pub(super) peer_connection_state: RTCPeerConnectionState,
    pub(super) signaling_state: RTCSignalingState,
}

impl EventDispatcher {
    pub(crate) fn new(pc: Weak<PeerConnectionInternal>) -> Self {
        EventDispatcher {
            pc,
            ice_states: HashMap::new(),
            dtls_states: HashMap::new(),
            gathering_states: HashMap::new(),
            transport_states: HashMap::new(),
            ice_gathering_state: RTCIceGatheringState::New,
            ice_connection_state: RTCIceConnectionState::New,
            peer_connection_state: RTCPeerConnectionState::New,
            signaling_state: RTCSignalingState::Stable,
        }
    }

    /// run processes events one at a time, in arrival order, until a
    /// termination event arrives or the connection is gone.
    pub(crate) async fn run(mut self, mut events_rx: mpsc::Receiver<RTCEventInternal>) {
        log::debug!("dispatch loop started");

        while let Some(event) = events_rx.recv().await {
            if event == RTCEventInternal::TerminationEvent {
                break;
            }
            let Some(pc) = self.pc.upgrade() else {
                break;
            };

            log::trace!("dispatching {event}");
            self.handle_event(&pc, event).await;
        }

        log::debug!("dispatch loop terminated");
    }

    async fn handle_event(&mut self, pc: &Arc<PeerConnectionInternal>, event: RTCEventInternal) {
        match event {
            RTCEventInternal::IceStateEvent {
                transport_id,
                state,
            } => {
                if self.ice_states.insert(transport_id, state).is_none() {
                    log::warn!("{transport_id}: ICE state before registration, unclean initialization?");
                }
                self.handle_ice_state_transition(pc).await;
            }
            RTCEventInternal::DtlsStateEvent {
                transport_id,
                state,
            } => {
                if self.dtls_states.insert(transport_id, state).is_none() {
                    log::warn!("{transport_id}: DTLS state before registration, unclean initialization?");
                }
                self.handle_dtls_state_transition(pc).await;
            }
            RTCEventInternal::IceGatheringEvent {
                transport_id,
                state,
            } => {
                if self.gathering_states.insert(transport_id, state).is_none() {
                    log::warn!(
                        "{transport_id}: gathering state before registration, unclean initialization?"
                    );
                }
                self.handle_ice_gathering_transition(pc, state).await;
            }
            RTCEventInternal::IceCandidateEvent {
                transport_id,
                candidate,
            } => match candidate {
                Some(candidate) => pc.do_ice_candidate(Some(candidate)),
                // the connection reports its own once gathering is complete
                None => log::trace!("{transport_id}: end of candidates"),
            },
            RTCEventInternal::SignalingStateEvent(state) => {
                self.handle_signaling_state(pc, state).await;
            }
            RTCEventInternal::ConnectionStateEvent(state) => {
                if self.peer_connection_state != state {
                    self.peer_connection_state = state;
                    pc.do_peer_connection_state_change(state);
                }
            }
            RTCEventInternal::TransportEvent {
                transport_id,
                state,
            } => {
                log::trace!("{transport_id}: transport state {state}");
                self.transport_states.insert(transport_id, state);
                if state == TransportState::New {
                    self.ice_states
                        .entry(transport_id)
                        .or_insert(RTCIceTransportState::New);
                    self.dtls_states
                        .entry(transport_id)
                        .or_insert(RTCDtlsTransportState::New);
                    self.gathering_states
                        .entry(transport_id)
                        .or_insert(RTCIceGatheringState::New);
                }
            }
            RTCEventInternal::TerminationEvent => {}
        }
    }
}
