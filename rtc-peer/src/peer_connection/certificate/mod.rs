//! X.509 certificates used to authenticate the DTLS handshake.
//!
//! A peer connection needs at least one certificate; when the configuration
//! carries none, an ECDSA P-256 certificate is generated when the connection
//! is created. The SHA-256 fingerprints of the certificates are what the
//! remote peer checks the handshake against.

use std::time::SystemTime;

use rcgen::{CertificateParams, KeyPair};
use sha2::{Digest, Sha256};

use crate::peer_connection::transport::dtls::fingerprint::RTCDtlsFingerprint;
use shared::error::{Error, Result};
use shared::util::math_rand_alpha;

/// RTCCertificate represents a x509Cert used to authenticate WebRTC communications.
#[derive(Clone, Debug)]
pub struct RTCCertificate {
    pub(crate) certificate_der: Vec<u8>,
    pub(crate) certificate_pem: String,
    pub(crate) private_key_der: Vec<u8>,
    pub(crate) expires: SystemTime,
}

impl PartialEq for RTCCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.certificate_der == other.certificate_der
    }
}

impl RTCCertificate {
    /// from_key_pair creates a self-signed certificate for a random common
    /// name with the given key pair.
    pub fn from_key_pair(key_pair: KeyPair) -> Result<Self> {
        if !(key_pair.is_compatible(&rcgen::PKCS_ED25519)
            || key_pair.is_compatible(&rcgen::PKCS_ECDSA_P256_SHA256))
        {
            return Err(Error::OtherCertificateErr(
                "unsupported key_pair".to_owned(),
            ));
        }

        let params = CertificateParams::new(vec![math_rand_alpha(16)])
            .map_err(|e| Error::OtherCertificateErr(e.to_string()))?;
        let expires: SystemTime = params.not_after.into();

        let certificate = params
            .self_signed(&key_pair)
            .map_err(|e| Error::OtherCertificateErr(e.to_string()))?;

        Ok(RTCCertificate {
            certificate_der: certificate.der().to_vec(),
            certificate_pem: certificate.pem(),
            private_key_der: key_pair.serialize_der(),
            expires,
        })
    }

    /// generate creates a certificate with a fresh ECDSA P-256 key pair.
    pub fn generate() -> Result<Self> {
        let key_pair = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256)
            .map_err(|e| Error::OtherCertificateErr(e.to_string()))?;
        RTCCertificate::from_key_pair(key_pair)
    }

    /// expires returns the timestamp after which this certificate is no longer valid.
    pub fn expires(&self) -> SystemTime {
        self.expires
    }

    pub fn der(&self) -> &[u8] {
        &self.certificate_der
    }

    pub fn pem(&self) -> &str {
        &self.certificate_pem
    }

    pub fn private_key_der(&self) -> &[u8] {
        &self.private_key_der
    }

    /// get_fingerprints returns the sha-256 fingerprint of the certificate,
    /// formatted the way an SDP fingerprint attribute carries it.
    pub fn get_fingerprints(&self) -> Vec<RTCDtlsFingerprint> {
        let hashed = Sha256::digest(&self.certificate_der);
        let values: Vec<String> = hashed.iter().map(|x| format!("{x:02x}")).collect();

        vec![RTCDtlsFingerprint {
            algorithm: "sha-256".to_owned(),
            value: values.join(":"),
        }]
    }
}
