use std::fmt;

use crate::peer_connection::configuration::UNSPECIFIED_STR;
use shared::error::{Error, Result};

/// RTCIceGatheringState describes the state of the candidate gathering
/// process, aggregated over every transport of a connection.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceGatheringState {
    #[default]
    Unspecified,

    /// New indicates that none of the transports has started gathering.
    New,

    /// Gathering indicates that at least one transport is gathering.
    Gathering,

    /// Complete indicates that every transport finished gathering.
    Complete,
}

const ICE_GATHERING_STATE_NEW_STR: &str = "new";
const ICE_GATHERING_STATE_GATHERING_STR: &str = "gathering";
const ICE_GATHERING_STATE_COMPLETE_STR: &str = "complete";

impl From<&str> for RTCIceGatheringState {
    fn from(raw: &str) -> Self {
        match raw {
            ICE_GATHERING_STATE_NEW_STR => RTCIceGatheringState::New,
            ICE_GATHERING_STATE_GATHERING_STR => RTCIceGatheringState::Gathering,
            ICE_GATHERING_STATE_COMPLETE_STR => RTCIceGatheringState::Complete,
            _ => RTCIceGatheringState::Unspecified,
        }
    }
}

impl From<u8> for RTCIceGatheringState {
    fn from(v: u8) -> Self {
        match v {
            1 => RTCIceGatheringState::New,
            2 => RTCIceGatheringState::Gathering,
            3 => RTCIceGatheringState::Complete,
            _ => RTCIceGatheringState::Unspecified,
        }
    }
}

impl fmt::Display for RTCIceGatheringState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTCIceGatheringState::New => ICE_GATHERING_STATE_NEW_STR,
            RTCIceGatheringState::Gathering => ICE_GATHERING_STATE_GATHERING_STR,
            RTCIceGatheringState::Complete => ICE_GATHERING_STATE_COMPLETE_STR,
            RTCIceGatheringState::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

/// Decides whether the connection-wide gathering state moves to `proposed`,
/// given the last state reported by every transport.
///
/// Returns `Ok(None)` when nothing changes: `proposed` equals `current`, it is
/// Complete while some transport is still gathering, or Complete was already
/// adopted. Moving back to New is rejected.
pub(crate) fn next_ice_gathering_state<'a>(
    current: RTCIceGatheringState,
    proposed: RTCIceGatheringState,
    transport_states: impl IntoIterator<Item = &'a RTCIceGatheringState>,
) -> Result<Option<RTCIceGatheringState>> {
    if proposed == current {
        return Ok(None);
    }

    match proposed {
        RTCIceGatheringState::Gathering if current == RTCIceGatheringState::Complete => Ok(None),
        RTCIceGatheringState::Gathering => Ok(Some(proposed)),
        RTCIceGatheringState::Complete => {
            if transport_states
                .into_iter()
                .all(|s| *s == RTCIceGatheringState::Complete)
            {
                Ok(Some(proposed))
            } else {
                Ok(None)
            }
        }
        _ => Err(Error::ErrIceGatheringStateInvalidTransition),
    }
}
