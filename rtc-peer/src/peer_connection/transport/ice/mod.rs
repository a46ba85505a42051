pub mod candidate;
pub mod gatherer_state;
pub mod parameters;
pub mod role;
pub mod server;
pub mod state;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::peer_connection::configuration::ice_transport_policy::RTCIceTransportPolicy;
use candidate::RTCIceCandidate;
use gatherer_state::RTCIceGathererState;
use parameters::RTCIceParameters;
use role::RTCIceRole;
use server::RTCIceServer;
use shared::error::Result;
use state::RTCIceTransportState;

pub type OnLocalCandidateHdlrFn = Box<
    dyn (FnMut(Option<RTCIceCandidate>) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

pub type OnICEGathererStateChangeHdlrFn = Box<
    dyn (FnMut(RTCIceGathererState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

pub type OnICETransportStateChangeHdlrFn = Box<
    dyn (FnMut(RTCIceTransportState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

/// RTCIceGatherOptions provides options relating to the gathering of ICE candidates.
#[derive(Default, Debug, Clone)]
pub struct RTCIceGatherOptions {
    pub ice_servers: Vec<RTCIceServer>,
    pub ice_gather_policy: RTCIceTransportPolicy,
    /// Credentials the gatherer advertises for its candidates.
    pub local_parameters: RTCIceParameters,
}

/// RTCIceGatherer gathers local host, server reflexive and relay
/// candidates, as well as enabling the retrieval of local Interactive
/// Connectivity Establishment (ICE) parameters which can be
/// exchanged in signaling.
#[async_trait]
pub trait RTCIceGatherer: Send + Sync {
    /// gather starts gathering candidates. Candidates and state changes are
    /// reported through the registered handlers.
    async fn gather(&self) -> Result<()>;

    fn on_local_candidate(&self, f: OnLocalCandidateHdlrFn);

    fn on_state_change(&self, f: OnICEGathererStateChangeHdlrFn);

    fn state(&self) -> RTCIceGathererState;

    fn local_parameters(&self) -> RTCIceParameters;
}

/// RTCIceTransport allows an application access to information about the ICE
/// transport over which packets are sent and received.
#[async_trait]
pub trait RTCIceTransport: Send + Sync {
    fn gatherer(&self) -> Arc<dyn RTCIceGatherer>;

    /// start runs connectivity checks against the remote peer described by
    /// `params`, taking `role` in candidate pair selection.
    async fn start(&self, params: RTCIceParameters, role: RTCIceRole) -> Result<()>;

    /// add_remote_candidate adds a candidate associated with the remote
    /// transport. None signals the end of remote candidates.
    async fn add_remote_candidate(&self, candidate: Option<RTCIceCandidate>) -> Result<()>;

    fn on_connection_state_change(&self, f: OnICETransportStateChangeHdlrFn);

    fn state(&self) -> RTCIceTransportState;

    async fn stop(&self) -> Result<()>;
}
