use std::fmt;

use serde::{Deserialize, Serialize};

/// RTCIceCandidate represents an ICE candidate gathered by the local agent or
/// signaled by the remote peer.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCIceCandidate {
    pub foundation: String,
    pub priority: u32,
    pub address: String,
    /// "udp" or "tcp"
    pub protocol: String,
    pub port: u16,
    /// "host", "srflx", "prflx" or "relay"
    pub typ: String,
    pub component: u16,
    pub related_address: String,
    pub related_port: u16,
}

/// RTCIceCandidateInit is the JSON form of a candidate exchanged through signaling.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCIceCandidateInit {
    pub candidate: String,
    #[serde(rename = "sdpMid")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_mline_index: Option<u16>,
    #[serde(rename = "usernameFragment")]
    pub username_fragment: Option<String>,
}

impl fmt::Display for RTCIceCandidate {
    /// Formats the candidate the way an SDP `candidate` attribute carries it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component,
            self.protocol,
            self.priority,
            self.address,
            self.port,
            self.typ
        )?;
        if !self.related_address.is_empty() {
            write!(f, " raddr {} rport {}", self.related_address, self.related_port)?;
        }
        Ok(())
    }
}

impl RTCIceCandidate {
    /// to_json returns an RTCIceCandidateInit as defined in the W3C WebRTC API
    /// <https://w3c.github.io/webrtc-pc/#dom-rtcicecandidate-tojson>
    pub fn to_json(&self, sdp_mid: &str) -> RTCIceCandidateInit {
        RTCIceCandidateInit {
            candidate: format!("candidate:{self}"),
            sdp_mid: Some(sdp_mid.to_owned()),
            sdp_mline_index: Some(0),
            username_fragment: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ice_candidate_to_json() {
        let tests = vec![
            (
                RTCIceCandidate {
                    foundation: "1".to_owned(),
                    priority: 2130706431,
                    address: "192.168.1.2".to_owned(),
                    protocol: "udp".to_owned(),
                    port: 50000,
                    typ: "host".to_owned(),
                    component: 1,
                    ..Default::default()
                },
                "candidate:1 1 udp 2130706431 192.168.1.2 50000 typ host",
            ),
            (
                RTCIceCandidate {
                    foundation: "2".to_owned(),
                    priority: 1694498815,
                    address: "1.2.3.4".to_owned(),
                    protocol: "udp".to_owned(),
                    port: 40000,
                    typ: "srflx".to_owned(),
                    component: 1,
                    related_address: "192.168.1.2".to_owned(),
                    related_port: 50000,
                },
                "candidate:2 1 udp 1694498815 1.2.3.4 40000 typ srflx raddr 192.168.1.2 rport 50000",
            ),
        ];

        for (candidate, expected) in tests {
            let init = candidate.to_json("0");
            assert_eq!(init.candidate, expected);
            assert_eq!(init.sdp_mid.as_deref(), Some("0"));
        }
    }
}
