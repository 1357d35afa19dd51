// Shared transport configuration for building reqwest::Client instances.
//
// The write/read path and the subscription path need different clients:
// a total request timeout would sever long-lived event streams, so the
// stream client carries a connect timeout only.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::Error;

const USER_AGENT: &str = concat!("robopanel/", env!("CARGO_PKG_VERSION"));

/// Connection settings for a remote key-path store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store base URL (e.g. `https://example.firebasedatabase.app/`).
    pub base_url: Url,
    /// Access token appended as the `auth` query parameter, if the store
    /// requires one.
    pub auth_token: Option<SecretString>,
    /// Total deadline for write and one-shot read requests.
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            auth_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_auth_token(mut self, token: SecretString) -> Self {
        self.auth_token = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the request/response client (writes, one-shot reads).
    pub(crate) fn build_client(&self) -> Result<reqwest::Client, Error> {
        Ok(reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?)
    }

    /// Build the subscription client. No total timeout — event streams
    /// stay open indefinitely.
    pub(crate) fn build_stream_client(&self) -> Result<reqwest::Client, Error> {
        Ok(reqwest::Client::builder()
            .connect_timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?)
    }

    /// Resolve a key path to its REST endpoint, applying auth.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let mut url = self.base_url.join(&format!("{}.json", path.trim_matches('/')))?;
        if let Some(ref token) = self.auth_token {
            url.query_pairs_mut()
                .append_pair("auth", token.expose_secret());
        }
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_json_suffix() {
        let cfg = StoreConfig::new("https://store.example/".parse().unwrap());
        let url = cfg.endpoint("device_status").unwrap();
        assert_eq!(url.as_str(), "https://store.example/device_status.json");
    }

    #[test]
    fn endpoint_carries_auth_token() {
        let cfg = StoreConfig::new("https://store.example/".parse().unwrap())
            .with_auth_token(SecretString::from("s3cret".to_string()));
        let url = cfg.endpoint("warning_alerts/w1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://store.example/warning_alerts/w1.json?auth=s3cret"
        );
    }
}
