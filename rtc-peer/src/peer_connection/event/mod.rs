use std::fmt;

use crate::peer_connection::state::peer_connection_state::RTCPeerConnectionState;
use crate::peer_connection::state::signaling_state::RTCSignalingState;
use crate::peer_connection::state::ice_gathering_state::RTCIceGatheringState;
use crate::peer_connection::transport::dtls::state::RTCDtlsTransportState;
use crate::peer_connection::transport::ice::candidate::RTCIceCandidate;
use crate::peer_connection::transport::ice::state::RTCIceTransportState;
use crate::peer_connection::transport::state::TransportState;
use crate::peer_connection::transport::TransportId;

/// Events flowing from the sub-transports through their transport loop into the
/// dispatch loop of the connection.
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RTCEventInternal {
    IceStateEvent {
        transport_id: TransportId,
        state: RTCIceTransportState,
    },
    DtlsStateEvent {
        transport_id: TransportId,
        state: RTCDtlsTransportState,
    },
    IceGatheringEvent {
        transport_id: TransportId,
        state: RTCIceGatheringState,
    },
    /// None marks the end of candidates.
    IceCandidateEvent {
        transport_id: TransportId,
        candidate: Option<RTCIceCandidate>,
    },
    SignalingStateEvent(RTCSignalingState),
    ConnectionStateEvent(RTCPeerConnectionState),
    TransportEvent {
        transport_id: TransportId,
        state: TransportState,
    },
    TerminationEvent,
}

impl fmt::Display for RTCEventInternal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RTCEventInternal::IceStateEvent {
                transport_id,
                state,
            } => write!(f, "IceStateEvent({transport_id}, {state})"),
            RTCEventInternal::DtlsStateEvent {
                transport_id,
                state,
            } => write!(f, "DtlsStateEvent({transport_id}, {state})"),
            RTCEventInternal::IceGatheringEvent {
                transport_id,
                state,
            } => write!(f, "IceGatheringEvent({transport_id}, {state})"),
            RTCEventInternal::IceCandidateEvent {
                transport_id,
                candidate,
            } => match candidate {
                Some(c) => write!(f, "IceCandidateEvent({transport_id}, {c})"),
                None => write!(f, "IceCandidateEvent({transport_id}, end-of-candidates)"),
            },
            RTCEventInternal::SignalingStateEvent(state) => {
                write!(f, "SignalingStateEvent({state})")
            }
            RTCEventInternal::ConnectionStateEvent(state) => {
                write!(f, "ConnectionStateEvent({state})")
            }
            RTCEventInternal::TransportEvent {
                transport_id,
                state,
            } => write!(f, "TransportEvent({transport_id}, {state})"),
            RTCEventInternal::TerminationEvent => write!(f, "TerminationEvent"),
        }
    }
}
