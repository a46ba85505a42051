use std::fmt;

use serde::{Deserialize, Serialize};

use crate::peer_connection::configuration::UNSPECIFIED_STR;
use crate::peer_connection::transport::ice::role::RTCIceRole;

/// RTCDtlsRole indicates the role of the DTLS transport.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RTCDtlsRole {
    #[default]
    Unspecified = 0,

    /// Auto defines the DTLS role is determined based on
    /// the resolved ICE role: the ICE controlled role acts as the DTLS
    /// client and the ICE controlling role acts as the DTLS server.
    #[serde(rename = "auto")]
    Auto = 1,

    /// Client defines the DTLS client role.
    #[serde(rename = "client")]
    Client = 2,

    /// Server defines the DTLS server role.
    #[serde(rename = "server")]
    Server = 3,
}

const DTLS_ROLE_AUTO_STR: &str = "auto";
const DTLS_ROLE_CLIENT_STR: &str = "client";
const DTLS_ROLE_SERVER_STR: &str = "server";

const SETUP_ACTIVE: &str = "active";
const SETUP_PASSIVE: &str = "passive";

impl fmt::Display for RTCDtlsRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RTCDtlsRole::Auto => DTLS_ROLE_AUTO_STR,
            RTCDtlsRole::Client => DTLS_ROLE_CLIENT_STR,
            RTCDtlsRole::Server => DTLS_ROLE_SERVER_STR,
            RTCDtlsRole::Unspecified => UNSPECIFIED_STR,
        };
        write!(f, "{s}")
    }
}

impl From<u8> for RTCDtlsRole {
    fn from(v: u8) -> Self {
        match v {
            1 => RTCDtlsRole::Auto,
            2 => RTCDtlsRole::Client,
            3 => RTCDtlsRole::Server,
            _ => RTCDtlsRole::Unspecified,
        }
    }
}

impl RTCDtlsRole {
    /// from_setup maps the value of an SDP `setup` attribute to the role the
    /// declaring side takes. <https://tools.ietf.org/html/rfc4145>
    /// `active` opens the connection, so it is the DTLS client; `passive` waits
    /// for it. Anything else, `actpass` included, leaves the role open.
    pub fn from_setup(value: Option<&str>) -> Self {
        match value {
            Some(SETUP_ACTIVE) => RTCDtlsRole::Client,
            Some(SETUP_PASSIVE) => RTCDtlsRole::Server,
            _ => RTCDtlsRole::Auto,
        }
    }

    pub fn is_explicit(self) -> bool {
        matches!(self, RTCDtlsRole::Client | RTCDtlsRole::Server)
    }

    /// The role the other end of the handshake takes.
    pub fn opposite(self) -> Self {
        match self {
            RTCDtlsRole::Client => RTCDtlsRole::Server,
            RTCDtlsRole::Server => RTCDtlsRole::Client,
            other => other,
        }
    }

    /// The role an endpoint takes when nothing was declared:
    /// ICE controlled is the DTLS client, ICE controlling is the DTLS server.
    pub fn from_ice_role(ice_role: RTCIceRole) -> Self {
        match ice_role {
            RTCIceRole::Controlled => RTCDtlsRole::Client,
            _ => RTCDtlsRole::Server,
        }
    }
}

/// Resolves the role negotiated for one media section out of what each side
/// declared. A local declaration wins, then the opposite of the remote one.
/// Without either, the role stays Auto until the handshake starts.
pub(crate) fn negotiate_dtls_role(local: RTCDtlsRole, remote: RTCDtlsRole) -> RTCDtlsRole {
    if local.is_explicit() {
        local
    } else if remote.is_explicit() {
        remote.opposite()
    } else {
        RTCDtlsRole::Auto
    }
}

/// Resolves the role handed to the DTLS transport when the handshake starts.
/// The result is never Auto.
pub(crate) fn resolve_local_dtls_role(
    transport_role: RTCDtlsRole,
    remote_role: RTCDtlsRole,
    ice_role: RTCIceRole,
) -> RTCDtlsRole {
    match negotiate_dtls_role(transport_role, remote_role) {
        RTCDtlsRole::Auto => RTCDtlsRole::from_ice_role(ice_role),
        role => role,
    }
}
