pub mod ice_transport_policy;
pub mod media_engine;
pub mod sdp_semantics;
pub mod setting_engine;

use crate::peer_connection::certificate::RTCCertificate;
use crate::peer_connection::transport::ice::server::RTCIceServer;
use ice_transport_policy::RTCIceTransportPolicy;
use sdp_semantics::RTCSdpSemantics;

pub(crate) const UNSPECIFIED_STR: &str = "Unspecified";

/// RTCConfiguration defines a set of parameters to configure how the
/// peer-to-peer communication via a peer connection is established or
/// re-established.
///
/// Use [`RTCConfigurationBuilder`] to create one.
#[derive(Default, Clone)]
pub struct RTCConfiguration {
    /// ice_servers defines a slice describing servers available to be used by
    /// ICE, such as STUN and TURN servers.
    pub(crate) ice_servers: Vec<RTCIceServer>,

    /// ice_transport_policy indicates which candidates the ICE gatherer is allowed
    /// to use.
    pub(crate) ice_transport_policy: RTCIceTransportPolicy,

    /// certificates describes a set of certificates that the peer connection
    /// uses to authenticate. When empty, one certificate is generated when the
    /// connection is created.
    pub(crate) certificates: Vec<RTCCertificate>,

    /// sdp_semantics controls how unmatched inbound streams are treated.
    pub(crate) sdp_semantics: RTCSdpSemantics,
}

impl RTCConfiguration {
    /// get_ice_servers side-steps the strict parsing mode of the ICE gatherer
    /// by stripping the query part of stun urls.
    pub(crate) fn get_ice_servers(&self) -> Vec<RTCIceServer> {
        self.ice_servers
            .iter()
            .cloned()
            .map(|mut ice_server| {
                for url in &mut ice_server.urls {
                    if url.starts_with("stun") {
                        if let Some((base, _query)) = url.split_once('?') {
                            *url = base.to_owned();
                        }
                    }
                }
                ice_server
            })
            .collect()
    }

    pub fn ice_servers(&self) -> &[RTCIceServer] {
        &self.ice_servers
    }

    pub fn ice_transport_policy(&self) -> RTCIceTransportPolicy {
        self.ice_transport_policy
    }

    pub fn sdp_semantics(&self) -> RTCSdpSemantics {
        self.sdp_semantics
    }

    pub fn certificates(&self) -> &[RTCCertificate] {
        &self.certificates
    }
}

#[derive(Default, Clone)]
pub struct RTCConfigurationBuilder {
    configuration: RTCConfiguration,
}

impl RTCConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<RTCIceServer>) -> Self {
        self.configuration.ice_servers = ice_servers;
        self
    }

    pub fn with_ice_transport_policy(mut self, policy: RTCIceTransportPolicy) -> Self {
        self.configuration.ice_transport_policy = policy;
        self
    }

    pub fn with_certificates(mut self, certificates: Vec<RTCCertificate>) -> Self {
        self.configuration.certificates = certificates;
        self
    }

    pub fn with_sdp_semantics(mut self, sdp_semantics: RTCSdpSemantics) -> Self {
        self.configuration.sdp_semantics = sdp_semantics;
        self
    }

    pub fn build(self) -> RTCConfiguration {
        self.configuration
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_configuration_get_ice_servers() {
        let tests = vec![
            (
                "stun:stun.l.google.com:19302?transport=udp",
                "stun:stun.l.google.com:19302",
            ),
            (
                "stuns:stun.example.org:5349",
                "stuns:stun.example.org:5349",
            ),
            (
                "turn:turn.example.org:3478?transport=tcp",
                "turn:turn.example.org:3478?transport=tcp",
            ),
        ];

        for (url, expected) in tests {
            let cfg = RTCConfigurationBuilder::new()
                .with_ice_servers(vec![RTCIceServer {
                    urls: vec![url.to_owned()],
                    ..Default::default()
                }])
                .build();

            let servers = cfg.get_ice_servers();
            assert_eq!(servers[0].urls[0], expected, "{url}");
            assert_eq!(cfg.ice_servers()[0].urls[0], url);
        }
    }

    #[test]
    fn test_configuration_builder_defaults() {
        let cfg = RTCConfigurationBuilder::new().build();
        assert_eq!(cfg.sdp_semantics(), RTCSdpSemantics::UnifiedPlan);
        assert_eq!(cfg.ice_transport_policy(), RTCIceTransportPolicy::Unspecified);
        assert!(cfg.certificates().is_empty());
    }
}
