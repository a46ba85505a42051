use std::fmt;
use std::io::Cursor;

use sdp::description::session::SessionDescription;
use serde::{Deserialize, Serialize};

use super::sdp_type::RTCSdpType;
use shared::error::{Error, Result};

/// RTCSessionDescription is used to expose local and remote session descriptions.
///
/// The parsed form is filled in by the constructors and when a description
/// is applied to a connection; it is never serialized.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct RTCSessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: RTCSdpType,

    pub sdp: String,

    #[serde(skip)]
    pub(crate) parsed: Option<SessionDescription>,
}

impl fmt::Display for RTCSessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type: {}, sdp:\n{}",
            self.sdp_type,
            self.sdp.replace("\r\n", "\n")
        )
    }
}

impl RTCSessionDescription {
    /// Given SDP representing an answer, wrap it in an RTCSessionDescription
    /// that can be given to a connection.
    pub fn answer(sdp: String) -> Result<RTCSessionDescription> {
        Self::with_type(RTCSdpType::Answer, sdp)
    }

    /// Given SDP representing an offer, wrap it in an RTCSessionDescription
    /// that can be given to a connection.
    pub fn offer(sdp: String) -> Result<RTCSessionDescription> {
        Self::with_type(RTCSdpType::Offer, sdp)
    }

    /// Given SDP representing a provisional answer, wrap it in an
    /// RTCSessionDescription that can be given to a connection.
    pub fn pranswer(sdp: String) -> Result<RTCSessionDescription> {
        Self::with_type(RTCSdpType::Pranswer, sdp)
    }

    fn with_type(sdp_type: RTCSdpType, sdp: String) -> Result<RTCSessionDescription> {
        let mut desc = RTCSessionDescription {
            sdp_type,
            sdp,
            parsed: None,
        };
        desc.parsed = Some(desc.unmarshal()?);
        Ok(desc)
    }

    /// Unmarshal is a helper to deserialize the sdp
    pub fn unmarshal(&self) -> Result<SessionDescription> {
        let mut reader = Cursor::new(self.sdp.as_bytes());
        SessionDescription::unmarshal(&mut reader).map_err(|err| Error::OtherSdpErr(err.to_string()))
    }

    /// The parsed description, parsing it now if it came in through serde.
    pub(crate) fn parsed(&mut self) -> Result<&SessionDescription> {
        if self.parsed.is_none() {
            self.parsed = Some(self.unmarshal()?);
        }
        self.parsed
            .as_ref()
            .ok_or_else(|| Error::OtherSdpErr("description not parsed".to_owned()))
    }
}
