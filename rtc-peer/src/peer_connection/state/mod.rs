pub mod ice_connection_state;
pub mod ice_gathering_state;
pub mod peer_connection_state;
pub mod signaling_state;
