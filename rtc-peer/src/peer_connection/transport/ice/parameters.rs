use sdp::description::media::MediaDescription;
use sdp::description::session::SessionDescription;
use serde::{Deserialize, Serialize};

use crate::peer_connection::sdp::attribute_with_fallback;
use shared::error::{Error, Result};
use shared::util::math_rand_alpha;

const ATTR_KEY_ICE_UFRAG: &str = "ice-ufrag";
const ATTR_KEY_ICE_PWD: &str = "ice-pwd";
const ATTR_KEY_ICE_LITE: &str = "ice-lite";

/// ufrag/pwd lengths of locally generated credentials, comfortably above the
/// minimum of <https://tools.ietf.org/html/rfc8445#section-5.3>
const LOCAL_UFRAG_LEN: usize = 16;
const LOCAL_PWD_LEN: usize = 32;

/// RTCIceParameters includes the ICE username fragment
/// and password and other ICE-related parameters.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTCIceParameters {
    pub username_fragment: String,
    pub password: String,
    pub ice_lite: bool,
}

impl RTCIceParameters {
    /// generate creates fresh random local credentials.
    pub fn generate() -> Self {
        RTCIceParameters {
            username_fragment: math_rand_alpha(LOCAL_UFRAG_LEN),
            password: math_rand_alpha(LOCAL_PWD_LEN),
            ice_lite: false,
        }
    }

    /// from_description resolves the remote credentials of a media section,
    /// falling back to the session level for each of them.
    pub(crate) fn from_description(
        media: Option<&MediaDescription>,
        session: &SessionDescription,
    ) -> Result<Self> {
        let username_fragment = attribute_with_fallback(media, session, ATTR_KEY_ICE_UFRAG)
            .flatten()
            .unwrap_or_default();
        if username_fragment.is_empty() {
            return Err(Error::ErrRemoteUfragEmpty);
        }

        let password = attribute_with_fallback(media, session, ATTR_KEY_ICE_PWD)
            .flatten()
            .unwrap_or_default();
        if password.is_empty() {
            return Err(Error::ErrRemotePwdEmpty);
        }

        Ok(RTCIceParameters {
            username_fragment: username_fragment.to_owned(),
            password: password.to_owned(),
            ice_lite: attribute_with_fallback(media, session, ATTR_KEY_ICE_LITE).is_some(),
        })
    }
}
