use serde::{Deserialize, Serialize};

use shared::error::{Error, Result};

/// RTCDtlsFingerprint specifies the hash function algorithm and certificate
/// fingerprint as described in <https://tools.ietf.org/html/rfc4572>.
///
/// The fingerprint exchanged in the description must match the certificate
/// the remote peer presents during the handshake.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCDtlsFingerprint {
    /// Algorithm specifies one of the hash function algorithms defined in
    /// the 'Hash function Textual Names' registry, e.g. "sha-256".
    pub algorithm: String,

    /// Value specifies the value of the certificate fingerprint in lowercase
    /// hex string as expressed utilizing the syntax of 'fingerprint' in
    /// <https://tools.ietf.org/html/rfc4572#section-5>.
    pub value: String,
}

impl TryFrom<&str> for RTCDtlsFingerprint {
    type Error = Error;

    /// Parses the value of an SDP `fingerprint` attribute, which must be
    /// exactly `"<algorithm> <value>"`.
    fn try_from(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(' ').collect();
        if parts.len() != 2 {
            return Err(Error::ErrSessionDescriptionInvalidFingerprint);
        }

        Ok(RTCDtlsFingerprint {
            algorithm: parts[0].to_owned(),
            value: parts[1].to_owned(),
        })
    }
}
