use std::fmt;

use crate::peer_connection::configuration::UNSPECIFIED_STR;
use crate::peer_connection::transport::ice::state::RTCIceTransportState;

/// RTCIceConnectionState indicates signaling state of the ICE Connection,
/// aggregated over the ICE transports of a connection.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceConnectionState {
    #[default]
    Unspecified,

    /// New indicates that any of the ICE transports are in the "new" state
    /// and none of them are in the "checking", "disconnected" or "failed" state,
    /// or all ICE transports are in the "closed" state, or there are no
    /// transports.
    New,

    /// Checking indicates that any of the ICE transports are in the
    /// "checking" state and none of them are in the "disconnected" or
    /// "failed" state.
    Checking,

    /// Connected indicates that all ICE transports are in the "connected",
    /// "completed" or "closed" state and at least one of them is in the
    /// "connected" state.
    Connected,

    /// Completed indicates that all ICE transports are in the "completed"
    /// or "closed" state and at least one of them is in the "completed" state.
    Completed,

    /// Disconnected indicates that any of the ICE transports are in the
    /// "disconnected" state and none of them are in the "failed" state.
    Disconnected,

    /// Failed indicates that any of the ICE transports are in the "failed"
    /// state.
    Failed,

    /// Closed indicates that the peer connection is closed.
    Closed,
}

const ICE_CONNECTION_STATE_NEW_STR: &str = "new";
const ICE_CONNECTION_STATE_CHECKING_STR: &str = "checking";
const ICE_CONNECTION_STATE_CONNECTED_STR: &str = "connected";
const ICE_CONNECTION_STATE_COMPLETED_STR: &str = "completed";
const ICE_CONNECTION_STATE_DISCONNECTED_STR: &str = "disconnected";
const ICE_CONNECTION_STATE_FAILED_STR: &str = "failed";
const ICE_CONNECTION_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for RTCIceConnectionState {
    fn from(raw: &str) -> Self {
        match raw {
            ICE_CONNECTION_STATE_NEW_STR => RTCIceConnectionState::New,
            ICE_CONNECTION_STATE_CHECKING_STR => RTCIceConnectionState::Checking,
            ICE_CONNECTION_STATE_CONNECTED_STR => RTCIceConnectionState::Connected,
            ICE_CONNECTION_STATE_COMPLETED_STR => RTCIceConnectionState::Completed,
            ICE_CONNECTION_STATE_DISCONNECTED_STR => RTCIceConnectionState::Disconnected,
            ICE_CONNECTION_STATE_FAILED_STR => RTCIceConnectionState::Failed,
            ICE_CONNECTION_STATE_CLOSED_STR => RTCIceConnectionState::Closed,
            _ => RTCIceConnectionState::Unspecified,
        }
    }
}

impl From<u8> for RTCIceConnectionState {
    fn from(v: u8) -> Self {
        match v {
            1 => RTCIceConnectionState::New,
            2 => RTCIceConnectionState::Checking,
            3 => RTCIceConnectionState::Connected,
            4 => RTCIceConnectionState::Completed,
            5 => RTCIceConnectionState::Disconnected,
            6 => RTCIceConnectionState::Failed,
            7 => RTCIceConnectionState::Closed,
            _ => RTCIceConnectionState::Unspecified,
        }
    }
}

impl fmt::Display for RTCIceConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTCIceConnectionState::New => ICE_CONNECTION_STATE_NEW_STR,
            RTCIceConnectionState::Checking => ICE_CONNECTION_STATE_CHECKING_STR,
            RTCIceConnectionState::Connected => ICE_CONNECTION_STATE_CONNECTED_STR,
            RTCIceConnectionState::Completed => ICE_CONNECTION_STATE_COMPLETED_STR,
            RTCIceConnectionState::Disconnected => ICE_CONNECTION_STATE_DISCONNECTED_STR,
            RTCIceConnectionState::Failed => ICE_CONNECTION_STATE_FAILED_STR,
            RTCIceConnectionState::Closed => ICE_CONNECTION_STATE_CLOSED_STR,
            RTCIceConnectionState::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

/// Aggregates the states of every ICE transport of a connection.
/// <https://w3c.github.io/webrtc-pc/#dom-rtciceconnectionstate>
pub(crate) fn aggregate_ice_connection_state<'a>(
    ice_states: impl IntoIterator<Item = &'a RTCIceTransportState>,
) -> RTCIceConnectionState {
    use RTCIceTransportState as S;

    let states: Vec<S> = ice_states.into_iter().copied().collect();

    if states.contains(&S::Failed) {
        RTCIceConnectionState::Failed
    } else if states.contains(&S::Disconnected) {
        RTCIceConnectionState::Disconnected
    } else if states
        .iter()
        .all(|s| matches!(s, S::New | S::Closed | S::Unspecified))
    {
        RTCIceConnectionState::New
    } else if states
        .iter()
        .any(|s| matches!(s, S::New | S::Checking | S::Unspecified))
    {
        RTCIceConnectionState::Checking
    } else if states
        .iter()
        .all(|s| matches!(s, S::Completed | S::Closed))
    {
        RTCIceConnectionState::Completed
    } else {
        RTCIceConnectionState::Connected
    }
}
