pub mod sdp_type;
pub mod session_description;

pub use sdp_type::RTCSdpType;
pub use session_description::RTCSessionDescription;

use sdp::description::media::MediaDescription;
use sdp::description::session::SessionDescription;

use crate::rtp_transceiver::rtp_codec::{RtpCodecKind, SSRC};

pub(crate) const ATTR_KEY_MID: &str = "mid";
pub(crate) const ATTR_KEY_GROUP: &str = "group";
pub(crate) const ATTR_KEY_SSRC: &str = "ssrc";
pub(crate) const ATTR_KEY_SETUP: &str = "setup";

const SEMANTIC_TOKEN_BUNDLE: &str = "BUNDLE";
const SSRC_MSID_PREFIX: &str = "msid:";

/// Looks an attribute up in the media section first and at session level
/// otherwise. The outer Option tells whether the attribute is present at all,
/// the inner one carries its value, if any.
pub(crate) fn attribute_with_fallback<'a>(
    media: Option<&'a MediaDescription>,
    session: &'a SessionDescription,
    key: &str,
) -> Option<Option<&'a str>> {
    media.and_then(|m| m.attribute(key)).or_else(|| {
        session
            .attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_deref())
    })
}

pub(crate) fn get_mid_value(media: &MediaDescription) -> Option<&str> {
    media.attribute(ATTR_KEY_MID).flatten()
}

pub(crate) fn get_by_mid<'a>(
    search_mid: &str,
    desc: &'a SessionDescription,
) -> Option<&'a MediaDescription> {
    desc.media_descriptions
        .iter()
        .find(|m| get_mid_value(m) == Some(search_mid))
}

/// The mids listed in the `a=group:BUNDLE` lines of a description.
pub(crate) fn bundle_mids(desc: &SessionDescription) -> Vec<String> {
    desc.attributes
        .iter()
        .filter(|a| a.key == ATTR_KEY_GROUP)
        .filter_map(|a| a.value.as_deref())
        .filter_map(|v| {
            let mut tokens = v.split_whitespace();
            (tokens.next() == Some(SEMANTIC_TOKEN_BUNDLE)).then_some(tokens)
        })
        .flatten()
        .map(ToOwned::to_owned)
        .collect()
}

/// A description is Plan B when its media sections are identified by media
/// type rather than by index, `a=mid:audio`, `a=mid:video`, `a=mid:data`.
pub(crate) fn description_is_plan_b(desc: &SessionDescription) -> bool {
    desc.media_descriptions
        .iter()
        .filter_map(get_mid_value)
        .any(|mid| matches!(mid, "audio" | "video" | "data"))
}

/// An inbound stream advertised by a remote description.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrackDetails {
    pub(crate) kind: RtpCodecKind,
    pub(crate) label: String,
    pub(crate) id: String,
    pub(crate) ssrc: SSRC,
}

/// Collects the streams advertised through `a=ssrc` lines, one per SSRC in the
/// order they first appear. The first line of an SSRC describes it unless a
/// later one carries `msid:<label> <id>`, which replaces it and ends the scan of
/// that media section.
pub(crate) fn track_details_from_media<'a>(
    media_sections: impl IntoIterator<Item = &'a MediaDescription>,
) -> Vec<TrackDetails> {
    let mut tracks: Vec<TrackDetails> = vec![];

    for media in media_sections {
        let kind = RtpCodecKind::from(media.media_name.media.as_str());
        if kind == RtpCodecKind::Unspecified {
            continue;
        }

        for attr in media.attributes.iter().filter(|a| a.key == ATTR_KEY_SSRC) {
            let value = attr.value.as_deref().unwrap_or_default();
            let split: Vec<&str> = value.split(' ').collect();
            let ssrc = match split[0].parse::<SSRC>() {
                Ok(ssrc) => ssrc,
                Err(err) => {
                    log::warn!("failed to parse SSRC {}: {}", split[0], err);
                    continue;
                }
            };

            let (label, id) = match split.as_slice() {
                [_, msid, id] if msid.starts_with(SSRC_MSID_PREFIX) => {
                    (msid[SSRC_MSID_PREFIX.len()..].to_owned(), (*id).to_owned())
                }
                _ => (String::new(), String::new()),
            };
            let complete = !label.is_empty() && !id.is_empty();

            let details = TrackDetails {
                kind,
                label,
                id,
                ssrc,
            };
            match tracks.iter_mut().find(|t| t.ssrc == ssrc) {
                Some(existing) if complete => *existing = details,
                Some(_) => {}
                None => tracks.push(details),
            }

            if complete {
                break;
            }
        }
    }

    tracks
}
