use sdp::description::media::MediaDescription;
use sdp::description::session::SessionDescription;
use serde::{Deserialize, Serialize};

use super::fingerprint::RTCDtlsFingerprint;
use super::role::RTCDtlsRole;
use crate::peer_connection::sdp::{ATTR_KEY_SETUP, attribute_with_fallback};
use shared::error::{Error, Result};

const ATTR_KEY_FINGERPRINT: &str = "fingerprint";

/// DTLSParameters holds information relating to DTLS configuration.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DTLSParameters {
    pub role: RTCDtlsRole,
    pub fingerprints: Vec<RTCDtlsFingerprint>,
}

/// resolve_dtls_parameters derives the DTLS role declared by a description and
/// its certificate fingerprint. Both attributes are looked up in the media
/// section first and then at session level.
///
/// A missing `setup` resolves to [`RTCDtlsRole::Auto`]; a missing fingerprint
/// is an error, as is one that is not exactly `"<algorithm> <value>"`.
pub fn resolve_dtls_parameters(
    media: Option<&MediaDescription>,
    session: &SessionDescription,
) -> Result<DTLSParameters> {
    let role = RTCDtlsRole::from_setup(
        attribute_with_fallback(media, session, ATTR_KEY_SETUP).flatten(),
    );

    let fingerprint = match attribute_with_fallback(media, session, ATTR_KEY_FINGERPRINT) {
        Some(value) => RTCDtlsFingerprint::try_from(value.unwrap_or_default())?,
        None => return Err(Error::ErrSessionDescriptionNoFingerprint),
    };

    Ok(DTLSParameters {
        role,
        fingerprints: vec![fingerprint],
    })
}
