use std::fmt;

use crate::peer_connection::configuration::UNSPECIFIED_STR;
use crate::peer_connection::sdp::sdp_type::RTCSdpType;
use shared::error::{Error, Result};

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum StateChangeOp {
    #[default]
    SetLocal,
    SetRemote,
}

impl fmt::Display for StateChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StateChangeOp::SetLocal => write!(f, "SetLocal"),
            StateChangeOp::SetRemote => write!(f, "SetRemote"),
        }
    }
}

/// RTCSignalingState indicates the signaling state of the offer/answer process.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCSignalingState {
    Unspecified = 0,

    /// Stable indicates there is no offer/answer exchange in
    /// progress. This is also the initial state, in which case the local and
    /// remote descriptions are nil.
    #[default]
    Stable,

    /// HaveLocalOffer indicates that a local description, of type "offer",
    /// has been successfully applied.
    HaveLocalOffer,

    /// HaveRemoteOffer indicates that a remote description, of type "offer",
    /// has been successfully applied.
    HaveRemoteOffer,

    /// HaveLocalPranswer indicates that a remote description of type "offer"
    /// has been successfully applied and a local description of type "pranswer"
    /// has been successfully applied.
    HaveLocalPranswer,

    /// HaveRemotePranswer indicates that a local description of type "offer"
    /// has been successfully applied and a remote description of type
    /// "pranswer" has been successfully applied.
    HaveRemotePranswer,

    /// Closed indicates The peer connection has been closed.
    Closed,
}

const SIGNALING_STATE_STABLE_STR: &str = "stable";
const SIGNALING_STATE_HAVE_LOCAL_OFFER_STR: &str = "have-local-offer";
const SIGNALING_STATE_HAVE_REMOTE_OFFER_STR: &str = "have-remote-offer";
const SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR: &str = "have-local-pranswer";
const SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR: &str = "have-remote-pranswer";
const SIGNALING_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for RTCSignalingState {
    fn from(raw: &str) -> Self {
        match raw {
            SIGNALING_STATE_STABLE_STR => RTCSignalingState::Stable,
            SIGNALING_STATE_HAVE_LOCAL_OFFER_STR => RTCSignalingState::HaveLocalOffer,
            SIGNALING_STATE_HAVE_REMOTE_OFFER_STR => RTCSignalingState::HaveRemoteOffer,
            SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR => RTCSignalingState::HaveLocalPranswer,
            SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR => RTCSignalingState::HaveRemotePranswer,
            SIGNALING_STATE_CLOSED_STR => RTCSignalingState::Closed,
            _ => RTCSignalingState::Unspecified,
        }
    }
}

impl From<u8> for RTCSignalingState {
    fn from(v: u8) -> Self {
        match v {
            1 => RTCSignalingState::Stable,
            2 => RTCSignalingState::HaveLocalOffer,
            3 => RTCSignalingState::HaveRemoteOffer,
            4 => RTCSignalingState::HaveLocalPranswer,
            5 => RTCSignalingState::HaveRemotePranswer,
            6 => RTCSignalingState::Closed,
            _ => RTCSignalingState::Unspecified,
        }
    }
}

impl fmt::Display for RTCSignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTCSignalingState::Stable => SIGNALING_STATE_STABLE_STR,
            RTCSignalingState::HaveLocalOffer => SIGNALING_STATE_HAVE_LOCAL_OFFER_STR,
            RTCSignalingState::HaveRemoteOffer => SIGNALING_STATE_HAVE_REMOTE_OFFER_STR,
            RTCSignalingState::HaveLocalPranswer => SIGNALING_STATE_HAVE_LOCAL_PRANSWER_STR,
            RTCSignalingState::HaveRemotePranswer => SIGNALING_STATE_HAVE_REMOTE_PRANSWER_STR,
            RTCSignalingState::Closed => SIGNALING_STATE_CLOSED_STR,
            RTCSignalingState::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

/// The state reached by applying a description of `sdp_type` through `op`.
pub(crate) fn signaling_state_after(op: StateChangeOp, sdp_type: RTCSdpType) -> RTCSignalingState {
    match (op, sdp_type) {
        (StateChangeOp::SetLocal, RTCSdpType::Offer) => RTCSignalingState::HaveLocalOffer,
        (StateChangeOp::SetRemote, RTCSdpType::Offer) => RTCSignalingState::HaveRemoteOffer,
        (StateChangeOp::SetLocal, RTCSdpType::Pranswer) => RTCSignalingState::HaveLocalPranswer,
        (StateChangeOp::SetRemote, RTCSdpType::Pranswer) => RTCSignalingState::HaveRemotePranswer,
        (_, RTCSdpType::Answer) | (_, RTCSdpType::Rollback) => RTCSignalingState::Stable,
        (_, RTCSdpType::Unspecified) => RTCSignalingState::Unspecified,
    }
}

/// check_next_signaling_state validates a transition against
/// <https://www.w3.org/TR/webrtc/#rtcsignalingstate-enum> 4.3.1.
pub(crate) fn check_next_signaling_state(
    cur: RTCSignalingState,
    next: RTCSignalingState,
    op: StateChangeOp,
    sdp_type: RTCSdpType,
) -> Result<RTCSignalingState> {
    use RTCSdpType as T;
    use RTCSignalingState as S;
    use StateChangeOp::*;

    if sdp_type == T::Rollback && cur == S::Stable {
        return Err(Error::ErrSignalingStateCannotRollback);
    }

    let valid = matches!(
        (cur, op, sdp_type, next),
        // stable->SetLocal(offer)->have-local-offer
        (S::Stable, SetLocal, T::Offer, S::HaveLocalOffer)
            // stable->SetRemote(offer)->have-remote-offer
            | (S::Stable, SetRemote, T::Offer, S::HaveRemoteOffer)
            // have-local-offer->SetLocal(offer)->have-local-offer
            | (S::HaveLocalOffer, SetLocal, T::Offer, S::HaveLocalOffer)
            // have-local-offer->SetRemote(answer)->stable
            | (S::HaveLocalOffer, SetRemote, T::Answer, S::Stable)
            // have-local-offer->SetRemote(pranswer)->have-remote-pranswer
            | (S::HaveLocalOffer, SetRemote, T::Pranswer, S::HaveRemotePranswer)
            // have-remote-pranswer->SetRemote(answer)->stable
            | (S::HaveRemotePranswer, SetRemote, T::Answer, S::Stable)
            // have-remote-offer->SetLocal(answer)->stable
            | (S::HaveRemoteOffer, SetLocal, T::Answer, S::Stable)
            // have-remote-offer->SetLocal(pranswer)->have-local-pranswer
            | (S::HaveRemoteOffer, SetLocal, T::Pranswer, S::HaveLocalPranswer)
            // have-local-pranswer->SetLocal(answer)->stable
            | (S::HaveLocalPranswer, SetLocal, T::Answer, S::Stable)
            // have-local-offer->SetLocal(rollback)->stable
            | (S::HaveLocalOffer, SetLocal, T::Rollback, S::Stable)
            // have-remote-offer->SetRemote(rollback)->stable
            | (S::HaveRemoteOffer, SetRemote, T::Rollback, S::Stable)
    );

    if valid {
        Ok(next)
    } else {
        Err(Error::ErrSignalingStateProposedTransitionInvalid(format!(
            "from {cur} applying {op} {sdp_type}"
        )))
    }
}
