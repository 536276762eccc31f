//! Verifier configuration loaded from environment variables.

use std::time::Duration;

/// Configuration for the HTTP endpoint verifier.
///
/// All fields have defaults suitable for hosted projects; override via
/// environment variables in other deployments.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Domain under which project endpoints are resolved; the probe
    /// targets `https://{project_id}.{base_domain}`.
    pub base_domain: String,
    /// Upper bound on a single probe, end to end.
    pub timeout: Duration,
}

impl VerifierConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default       |
    /// |------------------------------|---------------|
    /// | `DBSHIFT_VERIFY_BASE_DOMAIN` | `supabase.co` |
    /// | `DBSHIFT_VERIFY_TIMEOUT_SECS`| `10`          |
    pub fn from_env() -> Self {
        let base_domain =
            std::env::var("DBSHIFT_VERIFY_BASE_DOMAIN").unwrap_or_else(|_| "supabase.co".into());

        let timeout_secs: u64 = std::env::var("DBSHIFT_VERIFY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("DBSHIFT_VERIFY_TIMEOUT_SECS must be a valid u64");

        Self {
            base_domain,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            base_domain: "supabase.co".into(),
            timeout: Duration::from_secs(10),
        }
    }
}
