//! HTTP implementation of the [`EndpointVerifier`] seam.
//!
//! Probes `https://{project_id}.{base_domain}/auth/v1/settings` with the
//! service-role key. The settings endpoint requires a valid API key and
//! returns 401/403 for a bad one, which makes it a cheap authorization
//! check without touching any data.

use async_trait::async_trait;
use dbshift_core::{Credentials, VerifiedInfo};

use crate::config::VerifierConfig;
use crate::verifier::{EndpointVerifier, VerificationError};

/// Production verifier performing a real authenticated probe.
pub struct HttpVerifier {
    client: reqwest::Client,
    config: VerifierConfig,
}

impl HttpVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling when
    /// both endpoints share a verifier process).
    pub fn with_client(client: reqwest::Client, config: VerifierConfig) -> Self {
        Self { client, config }
    }

    fn probe_url(&self, credentials: &Credentials) -> String {
        format!(
            "https://{}.{}/auth/v1/settings",
            credentials.project_id, self.config.base_domain
        )
    }

    /// Map a transport-level failure onto the verification taxonomy.
    fn map_transport_error(error: reqwest::Error) -> VerificationError {
        if error.is_timeout() {
            VerificationError::Timeout
        } else if error.is_connect() {
            VerificationError::Unreachable
        } else {
            VerificationError::Unknown(error.to_string())
        }
    }
}

#[async_trait]
impl EndpointVerifier for HttpVerifier {
    async fn verify(&self, credentials: &Credentials) -> Result<VerifiedInfo, VerificationError> {
        let url = self.probe_url(credentials);
        let key = credentials.service_role.expose();

        tracing::debug!(project_id = %credentials.project_id, "Probing endpoint");

        let response = self
            .client
            .get(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(VerifiedInfo);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(VerificationError::AuthRejected);
        }
        Err(VerificationError::Unknown(format!(
            "unexpected status {status}"
        )))
    }
}
