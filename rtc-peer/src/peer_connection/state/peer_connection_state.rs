use std::fmt;

use crate::peer_connection::configuration::UNSPECIFIED_STR;
use crate::peer_connection::transport::dtls::state::RTCDtlsTransportState;
use crate::peer_connection::transport::ice::state::RTCIceTransportState;

/// RTCPeerConnectionState indicates the state of the peer connection,
/// aggregated over its ICE and DTLS transports.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCPeerConnectionState {
    #[default]
    Unspecified,

    /// New indicates that any of the ICE or DTLS transports are in the "new"
    /// state and none of the transports are in the "connecting", "checking",
    /// "failed" or "disconnected" state, or all transports are in the "closed"
    /// state, or there are no transports.
    New,

    /// Connecting indicates that any of the ICE or DTLS transports are in the
    /// "connecting" or "checking" state and none of them is in the "failed"
    /// state.
    Connecting,

    /// Connected indicates that all ICE and DTLS transports are in the
    /// "connected", "completed" or "closed" state and at least one of them is
    /// in the "connected" or "completed" state.
    Connected,

    /// Disconnected indicates that any of the ICE transports are in the
    /// "disconnected" state and none of them are in the "failed" state.
    Disconnected,

    /// Failed indicates that any of the ICE or DTLS transports are in a
    /// "failed" state.
    Failed,

    /// Closed indicates the peer connection is closed.
    Closed,
}

const PEER_CONNECTION_STATE_NEW_STR: &str = "new";
const PEER_CONNECTION_STATE_CONNECTING_STR: &str = "connecting";
const PEER_CONNECTION_STATE_CONNECTED_STR: &str = "connected";
const PEER_CONNECTION_STATE_DISCONNECTED_STR: &str = "disconnected";
const PEER_CONNECTION_STATE_FAILED_STR: &str = "failed";
const PEER_CONNECTION_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for RTCPeerConnectionState {
    fn from(raw: &str) -> Self {
        match raw {
            PEER_CONNECTION_STATE_NEW_STR => RTCPeerConnectionState::New,
            PEER_CONNECTION_STATE_CONNECTING_STR => RTCPeerConnectionState::Connecting,
            PEER_CONNECTION_STATE_CONNECTED_STR => RTCPeerConnectionState::Connected,
            PEER_CONNECTION_STATE_DISCONNECTED_STR => RTCPeerConnectionState::Disconnected,
            PEER_CONNECTION_STATE_FAILED_STR => RTCPeerConnectionState::Failed,
            PEER_CONNECTION_STATE_CLOSED_STR => RTCPeerConnectionState::Closed,
            _ => RTCPeerConnectionState::Unspecified,
        }
    }
}

impl From<u8> for RTCPeerConnectionState {
    fn from(v: u8) -> Self {
        match v {
            1 => RTCPeerConnectionState::New,
            2 => RTCPeerConnectionState::Connecting,
            3 => RTCPeerConnectionState::Connected,
            4 => RTCPeerConnectionState::Disconnected,
            5 => RTCPeerConnectionState::Failed,
            6 => RTCPeerConnectionState::Closed,
            _ => RTCPeerConnectionState::Unspecified,
        }
    }
}

impl fmt::Display for RTCPeerConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTCPeerConnectionState::New => PEER_CONNECTION_STATE_NEW_STR,
            RTCPeerConnectionState::Connecting => PEER_CONNECTION_STATE_CONNECTING_STR,
            RTCPeerConnectionState::Connected => PEER_CONNECTION_STATE_CONNECTED_STR,
            RTCPeerConnectionState::Disconnected => PEER_CONNECTION_STATE_DISCONNECTED_STR,
            RTCPeerConnectionState::Failed => PEER_CONNECTION_STATE_FAILED_STR,
            RTCPeerConnectionState::Closed => PEER_CONNECTION_STATE_CLOSED_STR,
            RTCPeerConnectionState::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

/// Aggregates the states of every ICE and DTLS transport of a connection.
/// <https://w3c.github.io/webrtc-pc/#dom-rtcpeerconnectionstate>
pub(crate) fn aggregate_peer_connection_state<'a, 'b>(
    ice_states: impl IntoIterator<Item = &'a RTCIceTransportState>,
    dtls_states: impl IntoIterator<Item = &'b RTCDtlsTransportState>,
) -> RTCPeerConnectionState {
    use RTCDtlsTransportState as D;
    use RTCIceTransportState as I;

    let ice: Vec<I> = ice_states.into_iter().copied().collect();
    let dtls: Vec<D> = dtls_states.into_iter().copied().collect();

    if ice.contains(&I::Failed) || dtls.contains(&D::Failed) {
        return RTCPeerConnectionState::Failed;
    }
    if ice.contains(&I::Disconnected) {
        return RTCPeerConnectionState::Disconnected;
    }

    let ice_idle = ice
        .iter()
        .all(|s| matches!(s, I::New | I::Closed | I::Unspecified));
    let dtls_idle = dtls
        .iter()
        .all(|s| matches!(s, D::New | D::Closed | D::Unspecified));
    if ice_idle && dtls_idle {
        return RTCPeerConnectionState::New;
    }

    let ice_up = ice
        .iter()
        .all(|s| matches!(s, I::Connected | I::Completed | I::Closed));
    let dtls_up = dtls
        .iter()
        .all(|s| matches!(s, D::Connected | D::Closed));
    if ice_up && dtls_up {
        RTCPeerConnectionState::Connected
    } else {
        RTCPeerConnectionState::Connecting
    }
}
