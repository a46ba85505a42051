use std::fmt;

use crate::peer_connection::configuration::UNSPECIFIED_STR;

/// RTCIceTransportState represents the current state of the ICE transport.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceTransportState {
    #[default]
    Unspecified,

    /// New indicates the ICE transport is gathering addresses or waiting for
    /// remote candidates to be supplied.
    New,

    /// Checking indicates the ICE transport has received at least one remote
    /// candidate and is checking candidate pairs.
    Checking,

    /// Connected indicates the ICE transport has found a usable connection
    /// but is still checking other candidate pairs.
    Connected,

    /// Completed indicates the ICE transport has finished gathering and
    /// checking and found a connection for all components.
    Completed,

    /// Failed indicates the ICE transport has finished gathering and
    /// checking all candidate pairs and failed to find a connection.
    Failed,

    /// Disconnected indicates the ICE transport has lost connectivity
    /// with the remote peer.
    Disconnected,

    /// Closed indicates the ICE transport has shut down and is no longer
    /// responding to STUN requests.
    Closed,
}

const ICE_TRANSPORT_STATE_NEW_STR: &str = "new";
const ICE_TRANSPORT_STATE_CHECKING_STR: &str = "checking";
const ICE_TRANSPORT_STATE_CONNECTED_STR: &str = "connected";
const ICE_TRANSPORT_STATE_COMPLETED_STR: &str = "completed";
const ICE_TRANSPORT_STATE_FAILED_STR: &str = "failed";
const ICE_TRANSPORT_STATE_DISCONNECTED_STR: &str = "disconnected";
const ICE_TRANSPORT_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for RTCIceTransportState {
    fn from(raw: &str) -> Self {
        match raw {
            ICE_TRANSPORT_STATE_NEW_STR => RTCIceTransportState::New,
            ICE_TRANSPORT_STATE_CHECKING_STR => RTCIceTransportState::Checking,
            ICE_TRANSPORT_STATE_CONNECTED_STR => RTCIceTransportState::Connected,
            ICE_TRANSPORT_STATE_COMPLETED_STR => RTCIceTransportState::Completed,
            ICE_TRANSPORT_STATE_FAILED_STR => RTCIceTransportState::Failed,
            ICE_TRANSPORT_STATE_DISCONNECTED_STR => RTCIceTransportState::Disconnected,
            ICE_TRANSPORT_STATE_CLOSED_STR => RTCIceTransportState::Closed,
            _ => RTCIceTransportState::Unspecified,
        }
    }
}

impl fmt::Display for RTCIceTransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTCIceTransportState::New => ICE_TRANSPORT_STATE_NEW_STR,
            RTCIceTransportState::Checking => ICE_TRANSPORT_STATE_CHECKING_STR,
            RTCIceTransportState::Connected => ICE_TRANSPORT_STATE_CONNECTED_STR,
            RTCIceTransportState::Completed => ICE_TRANSPORT_STATE_COMPLETED_STR,
            RTCIceTransportState::Failed => ICE_TRANSPORT_STATE_FAILED_STR,
            RTCIceTransportState::Disconnected => ICE_TRANSPORT_STATE_DISCONNECTED_STR,
            RTCIceTransportState::Closed => ICE_TRANSPORT_STATE_CLOSED_STR,
            RTCIceTransportState::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}
