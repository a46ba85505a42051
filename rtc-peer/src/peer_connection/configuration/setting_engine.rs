use std::time::Duration;

#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct Timeout {
    pub(crate) ice_connect: Option<Duration>,
    pub(crate) dtls_handshake: Option<Duration>,
}

/// SettingEngine allows influencing behavior in ways that are not
/// supported by the WebRTC API. This allows us to support additional
/// use-cases without deviating from the WebRTC API elsewhere.
#[derive(Default, Debug, Clone)]
pub struct SettingEngine {
    pub(crate) timeout: Timeout,
}

impl SettingEngine {
    /// set_ice_connect_timeout bounds how long `ice_transport.start` may run.
    /// A phase that runs out of time is logged and the transport stays where it was.
    /// None (the default) waits forever.
    pub fn set_ice_connect_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout.ice_connect = timeout;
    }

    /// set_dtls_handshake_timeout bounds how long `dtls_transport.start` may run.
    pub fn set_dtls_handshake_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout.dtls_handshake = timeout;
    }
}
