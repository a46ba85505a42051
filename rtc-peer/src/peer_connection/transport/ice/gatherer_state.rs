use std::fmt;

use crate::peer_connection::configuration::UNSPECIFIED_STR;
use crate::peer_connection::state::ice_gathering_state::RTCIceGatheringState;

/// RTCIceGathererState represents the current state of a single ICE gatherer.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceGathererState {
    #[default]
    Unspecified,

    /// New indicates object has been created but
    /// gather() has not been called.
    New,

    /// Gathering indicates gather() has been called,
    /// and the gatherer is in the process of gathering candidates.
    Gathering,

    /// Complete indicates the gatherer has completed gathering.
    Complete,

    /// Closed indicates the closed state can only be entered
    /// when the gatherer has been closed intentionally by calling close().
    Closed,
}

const ICE_GATHERER_STATE_NEW_STR: &str = "new";
const ICE_GATHERER_STATE_GATHERING_STR: &str = "gathering";
const ICE_GATHERER_STATE_COMPLETE_STR: &str = "complete";
const ICE_GATHERER_STATE_CLOSED_STR: &str = "closed";

impl fmt::Display for RTCIceGathererState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTCIceGathererState::New => ICE_GATHERER_STATE_NEW_STR,
            RTCIceGathererState::Gathering => ICE_GATHERER_STATE_GATHERING_STR,
            RTCIceGathererState::Complete => ICE_GATHERER_STATE_COMPLETE_STR,
            RTCIceGathererState::Closed => ICE_GATHERER_STATE_CLOSED_STR,
            RTCIceGathererState::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

impl RTCIceGathererState {
    /// The gathering state a gatherer reports to its connection. Only the
    /// start and the end of gathering are reported.
    pub(crate) fn to_gathering_state(self) -> Option<RTCIceGatheringState> {
        match self {
            RTCIceGathererState::Gathering => Some(RTCIceGatheringState::Gathering),
            RTCIceGathererState::Complete => Some(RTCIceGatheringState::Complete),
            _ => None,
        }
    }
}
