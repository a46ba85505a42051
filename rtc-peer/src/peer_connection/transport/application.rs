use std::sync::Arc;

use async_trait::async_trait;
use sdp::description::media::MediaDescription;
use sdp::description::session::SessionDescription;
use tokio::sync::Mutex;

use super::sctp::{RTCSctpTransport, SCTPTransportCapabilities};
use super::{Transport, TransportCore};
use crate::peer_connection::sdp::attribute_with_fallback;
use shared::error::Result;

const ATTR_KEY_MAX_MESSAGE_SIZE: &str = "max-message-size";

/// ApplicationTransport carries the data channels of a connection over SCTP.
pub struct ApplicationTransport {
    core: TransportCore,
    mid: Option<String>,
    sctp_transport: Mutex<Option<Arc<dyn RTCSctpTransport>>>,
}

impl ApplicationTransport {
    pub(crate) fn new(core: TransportCore, mid: Option<String>) -> Self {
        ApplicationTransport {
            core,
            mid,
            sctp_transport: Mutex::new(None),
        }
    }

    /// The SCTP transport, once DTLS is connected.
    pub async fn sctp_transport(&self) -> Option<Arc<dyn RTCSctpTransport>> {
        self.sctp_transport.lock().await.clone()
    }
}

/// The capabilities the remote side advertised for its SCTP association.
fn remote_capabilities(
    media: Option<&MediaDescription>,
    session: Option<&SessionDescription>,
) -> SCTPTransportCapabilities {
    let max_message_size = session
        .and_then(|session| attribute_with_fallback(media, session, ATTR_KEY_MAX_MESSAGE_SIZE))
        .flatten()
        .and_then(|value| value.parse::<u32>().ok());

    match max_message_size {
        Some(max_message_size) => SCTPTransportCapabilities { max_message_size },
        None => SCTPTransportCapabilities::default(),
    }
}

#[async_trait]
impl Transport for ApplicationTransport {
    fn core(&self) -> &TransportCore {
        &self.core
    }

    async fn get_mids(&self) -> Vec<String> {
        self.mid.iter().cloned().collect()
    }

    async fn start_secure_session(&self) -> Result<()> {
        let dtls_transport = self.core.dtls_transport()?;
        let pc = self.core.peer_connection()?;

        let remote_media = self.remote_media_description().await;
        let remote_caps = {
            let descriptions = pc.descriptions.lock().await;
            remote_capabilities(remote_media.as_ref(), descriptions.remote_session())
        };

        let sctp_transport = pc.backend.new_sctp_transport(dtls_transport)?;
        *self.sctp_transport.lock().await = Some(Arc::clone(&sctp_transport));

        log::debug!(
            "{}: starting SCTP with max message size {}",
            self.core.id,
            remote_caps.max_message_size
        );
        sctp_transport.start(remote_caps).await
    }

    async fn stop_secure_session(&self) -> Result<()> {
        let sctp_transport = self.sctp_transport.lock().await.take();
        match sctp_transport {
            Some(sctp_transport) => sctp_transport.stop().await,
            None => Ok(()),
        }
    }
}
