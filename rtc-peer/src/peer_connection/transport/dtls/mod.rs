pub mod fingerprint;
pub mod parameters;
pub mod role;
pub mod state;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::peer_connection::transport::ice::RTCIceTransport;
use parameters::DTLSParameters;
use shared::error::Result;
use state::RTCDtlsTransportState;

pub type OnDtlsTransportStateChangeHdlrFn = Box<
    dyn (FnMut(RTCDtlsTransportState) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>)
        + Send
        + Sync,
>;

/// RTCDtlsTransport allows an application access to information about the DTLS
/// transport over which RTP and RTCP packets are sent and received, as well as
/// the SCTP packets of data channels.
///
/// The handshake itself is performed by the implementation; the peer connection
/// only starts it once ICE is connected and reacts to its state changes.
#[async_trait]
pub trait RTCDtlsTransport: Send + Sync {
    /// The ICE transport this DTLS transport runs over.
    fn ice_transport(&self) -> Arc<dyn RTCIceTransport>;

    /// start performs the handshake with the resolved local role, verifying the
    /// remote certificate against `remote_parameters.fingerprints`.
    async fn start(&self, remote_parameters: DTLSParameters) -> Result<()>;

    /// stop stops and closes the transport. Calling it twice is not an error.
    async fn stop(&self) -> Result<()>;

    fn on_state_change(&self, f: OnDtlsTransportStateChangeHdlrFn);

    fn state(&self) -> RTCDtlsTransportState;

    /// The SRTP session keyed by the handshake, once it completed.
    async fn srtp_session(&self) -> Option<Arc<dyn SrtpSession>>;

    /// The SRTCP session keyed by the handshake, once it completed.
    async fn srtcp_session(&self) -> Option<Arc<dyn SrtpSession>>;
}

/// SrtpSession is an SRTP or SRTCP session over a connected DTLS transport.
#[async_trait]
pub trait SrtpSession: Send + Sync {
    /// open_write_stream returns the stream used to send protected packets.
    async fn open_write_stream(&self) -> Result<Arc<dyn SrtpStream>>;

    /// accept_stream waits for an inbound SSRC no receiver has opened a stream for.
    /// It fails once the session is closed.
    async fn accept_stream(&self) -> Result<Arc<dyn SrtpStream>>;
}

#[async_trait]
pub trait SrtpStream: Send + Sync {
    fn ssrc(&self) -> u32;

    async fn write(&self, buf: &Bytes) -> Result<usize>;
}
