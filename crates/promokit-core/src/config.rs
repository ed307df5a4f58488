// ── Runtime collaborator configuration ──
//
// These types describe *where* the code source and redemption sink live and
// how to reach them. They never touch disk: the CLI (via promokit-config)
// builds a `DeskConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use promokit_api::transport::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default: collaborators are public HTTPS.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed staging deployments).
    DangerAcceptInvalid,
}

/// Configuration for one desk: one code source plus one redemption sink.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Code source endpoint (GET).
    pub source_url: Url,
    /// Redemption sink endpoint (POST). Often the same as `source_url`.
    pub redeem_url: Url,
    /// Optional collaborator access key, sent as `X-API-KEY`.
    pub api_key: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout for both collaborators.
    pub timeout: Duration,
}

impl DeskConfig {
    /// A config where one endpoint serves both reads and redemptions.
    pub fn new(source_url: Url) -> Self {
        Self {
            redeem_url: source_url.clone(),
            source_url,
            api_key: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            api_key: self.api_key.clone(),
        }
    }
}
