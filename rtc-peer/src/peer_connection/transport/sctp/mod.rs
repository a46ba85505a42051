use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use shared::error::Result;

/// Largest message the local SCTP stack accepts.
pub(crate) const DEFAULT_MAX_MESSAGE_SIZE: u32 = 65536;

/// SCTPTransportCapabilities indicates the capabilities of the SCTP transport.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SCTPTransportCapabilities {
    pub max_message_size: u32,
}

impl Default for SCTPTransportCapabilities {
    fn default() -> Self {
        SCTPTransportCapabilities {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// RTCSctpTransport carries the data channels of a connection over a
/// connected DTLS transport.
#[async_trait]
pub trait RTCSctpTransport: Send + Sync {
    /// start the association with the remote capabilities.
    async fn start(&self, remote_caps: SCTPTransportCapabilities) -> Result<()>;

    async fn stop(&self) -> Result<()>;
}
