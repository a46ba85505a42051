use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum Error {
    //Negotiation
    /// ErrSessionDescriptionNoFingerprint indicates that neither the media section nor the
    /// session level of a description carries a fingerprint attribute.
    #[error("description has no fingerprint")]
    ErrSessionDescriptionNoFingerprint,
    /// ErrSessionDescriptionInvalidFingerprint indicates a fingerprint attribute that is not
    /// exactly "<algorithm> <value>".
    #[error("description has an invalid fingerprint")]
    ErrSessionDescriptionInvalidFingerprint,
    #[error("remote ice-ufrag is empty")]
    ErrRemoteUfragEmpty,
    #[error("remote ice-pwd is empty")]
    ErrRemotePwdEmpty,
    /// ErrNoRemoteDescription indicates that an operation was rejected because
    /// the remote description is not set
    #[error("remote description is not set")]
    ErrNoRemoteDescription,
    #[error("local description is not set")]
    ErrNoLocalDescription,
    /// ErrCodecNotFound is returned when a codec search to the Media Engine fails
    #[error("codec not found")]
    ErrCodecNotFound,

    //Signaling
    #[error("can't rollback from stable state")]
    ErrSignalingStateCannotRollback,
    #[error("invalid proposed signaling state transition: {0}")]
    ErrSignalingStateProposedTransitionInvalid(String),
    #[error("ice gathering state can not move back to new")]
    ErrIceGatheringStateInvalidTransition,

    //Transport
    /// ErrConnectionClosed indicates an operation executed after connection
    /// has already been closed.
    #[error("connection closed")]
    ErrConnectionClosed,
    #[error("transport has no dtls transport")]
    ErrTransportNotInitialized,
    #[error("srtp session is not ready")]
    ErrSrtpSessionNotReady,
    #[error("srtcp session is not ready")]
    ErrSrtcpSessionNotReady,
    #[error("no media transport")]
    ErrNoMediaTransport,
    #[error("operation timed out")]
    ErrTimeout,
    /// ErrNoTransportBackend indicates an API built without the factory that
    /// creates ICE, DTLS and SCTP sub-transports.
    #[error("no transport backend configured")]
    ErrNoTransportBackend,

    //RTP
    #[error("Unknown type")]
    ErrUnknownType,
    #[error("track does not exist")]
    ErrTrackNotExisted,
    #[error("invalid state change in RTPTransceiver.setSending")]
    ErrRTPTransceiverSetSendingInvalidState,
    #[error("no transceivers")]
    ErrNoTransceivers,

    //Other Errors
    #[error("Other SDP Err: {0}")]
    OtherSdpErr(String),
    #[error("Other RTCP Err: {0}")]
    OtherRtcpErr(String),
    #[error("Other ICE Err: {0}")]
    OtherIceErr(String),
    #[error("Other DTLS Err: {0}")]
    OtherDtlsErr(String),
    #[error("Other SRTP Err: {0}")]
    OtherSrtpErr(String),
    #[error("Other SCTP Err: {0}")]
    OtherSctpErr(String),
    #[error("Other Certificate Err: {0}")]
    OtherCertificateErr(String),
    #[error("{0}")]
    Other(String),
}
