pub mod track_local;
pub mod track_remote;

/// MediaStreamId identifies the stream a track belongs to, the `label` of an
/// `msid` attribute.
pub type MediaStreamId = String;

/// MediaStreamTrackId identifies a track within its stream.
pub type MediaStreamTrackId = String;
