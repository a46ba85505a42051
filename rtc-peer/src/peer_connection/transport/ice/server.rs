use serde::{Deserialize, Serialize};

/// RTCIceServer describes a single STUN and TURN server that can be used by
/// the ICE gatherer to establish a connection with a peer.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCIceServer {
    pub urls: Vec<String>,
    pub username: String,
    pub credential: String,
}
