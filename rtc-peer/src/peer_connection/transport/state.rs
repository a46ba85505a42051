use std::fmt;

use crate::peer_connection::configuration::UNSPECIFIED_STR;

/// TransportState is the lifecycle of a transport as a whole, across its ICE
/// and DTLS sub-transports.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Unspecified,

    /// New indicates the sub-transports were created.
    New,

    /// Connecting indicates ICE connectivity establishment was started.
    Connecting,

    /// Connected indicates the DTLS handshake completed and the secure
    /// session (SRTP or SCTP) was activated.
    Connected,

    /// Closed indicates the transport was disconnected.
    Closed,
}

const TRANSPORT_STATE_NEW_STR: &str = "new";
const TRANSPORT_STATE_CONNECTING_STR: &str = "connecting";
const TRANSPORT_STATE_CONNECTED_STR: &str = "connected";
const TRANSPORT_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for TransportState {
    fn from(raw: &str) -> Self {
        match raw {
            TRANSPORT_STATE_NEW_STR => TransportState::New,
            TRANSPORT_STATE_CONNECTING_STR => TransportState::Connecting,
            TRANSPORT_STATE_CONNECTED_STR => TransportState::Connected,
            TRANSPORT_STATE_CLOSED_STR => TransportState::Closed,
            _ => TransportState::Unspecified,
        }
    }
}

impl From<u8> for TransportState {
    fn from(v: u8) -> Self {
        match v {
            1 => TransportState::New,
            2 => TransportState::Connecting,
            3 => TransportState::Connected,
            4 => TransportState::Closed,
            _ => TransportState::Unspecified,
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            TransportState::New => TRANSPORT_STATE_NEW_STR,
            TransportState::Connecting => TRANSPORT_STATE_CONNECTING_STR,
            TransportState::Connected => TRANSPORT_STATE_CONNECTED_STR,
            TransportState::Closed => TRANSPORT_STATE_CLOSED_STR,
            TransportState::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}
