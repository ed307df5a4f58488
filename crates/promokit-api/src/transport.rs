// Shared transport configuration for building reqwest::Client instances.
//
// The code source and the redemption sink are usually the same deployment,
// so one client (TLS, timeout, default headers) serves both.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

const USER_AGENT: &str = concat!("promokit/", env!("CARGO_PKG_VERSION"));

/// Header carrying the optional collaborator access key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// TLS verification mode (api-level mirror of core's `TlsVerification`).
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed staging deployments).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub api_key: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// When an API key is configured it is injected as a sensitive
    /// `X-API-KEY` default header on every request.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(self.default_headers()?);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Timeout in whole seconds, for error reporting.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    fn default_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        if let Some(ref key) = self.api_key {
            let mut value = HeaderValue::from_str(key.expose_secret())
                .map_err(|e| Error::InvalidApiKey(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }
        Ok(headers)
    }
}
