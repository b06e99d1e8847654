//! HTTP access to the device status endpoint.

use std::time::Duration;

use backon::{BackoffBuilder, ConstantBuilder, Retryable as _};
use snafu::ResultExt as _;
use tracing::{debug, warn};

use crate::crypto;
use crate::error::{ClientError, RetriesExhausted, Transport};
use crate::report::{self, Report};
use crate::status::StatusSnapshot;

/// Path of the status document on the device.
const STATUS_PATH: &str = "/data/Status.json";

/// Default per-attempt request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of retry attempts after the initial try.
const DEFAULT_RETRY_ATTEMPTS: usize = 3;

/// Default fixed delay between attempts.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Configuration for [`DeviceClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    hostname: String,
    port: u16,
    key_hex: String,
    request_timeout: Duration,
    retry_attempts: usize,
    retry_delay: Duration,
}

impl ClientConfig {
    /// Creates a configuration for the device at `hostname`:`port`, decrypting with `key_hex`.
    pub fn new(hostname: impl Into<String>, port: u16, key_hex: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            key_hex: key_hex.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets the per-attempt request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the retry policy: `attempts` additional tries after the initial one, `delay` apart.
    pub fn with_retry_policy(mut self, attempts: usize, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }
}

impl BackoffBuilder for &ClientConfig {
    type Backoff = <ConstantBuilder as BackoffBuilder>::Backoff;

    fn build(self) -> Self::Backoff {
        ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(self.retry_attempts)
            .build()
    }
}

/// Client for the device status endpoint.
///
/// Owns its HTTP client; construct once at startup and pass by reference
/// rather than relying on any ambient shared session. Certificate
/// verification is intentionally disabled and ambient proxy configuration is
/// ignored: the devices serve self-signed certificates on the local network,
/// where reachability wins over strict verification.
pub struct DeviceClient {
    http: reqwest::Client,
    url: String,
    key: Vec<u8>,
    config: ClientConfig,
}

impl DeviceClient {
    /// Creates a client from the given configuration.
    ///
    /// The decryption key is decoded and validated here, so a bad key fails
    /// fast instead of burning the retry budget on requests it can never
    /// decrypt.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not valid hex of a supported length,
    /// or if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let key = crypto::decode_key(&config.key_hex)?;
        let url = format!("http://{}:{}{}", config.hostname, config.port, STATUS_PATH);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(true)
            .no_proxy()
            .build()
            .context(Transport { url: url.clone() })?;

        Ok(Self { http, url, key, config })
    }

    /// URL of the status document this client queries.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches and decodes the status report, retrying failed attempts.
    ///
    /// One attempt is a full fetch-and-decode. A response that arrives but
    /// does not decode counts as a failed attempt and triggers a fresh
    /// fetch, since the cause may be transient; a response that decodes but
    /// is missing fields is handled downstream, outside the retry loop.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RetriesExhausted`] wrapping the last attempt's
    /// failure once the retry budget is spent.
    pub async fn fetch_report(&self) -> Result<Report, ClientError> {
        let attempts = self.config.retry_attempts + 1;

        (|| async { self.fetch_report_once().await })
            .retry(&self.config)
            .notify(|e, delay| {
                warn!(error = %e, "Status fetch attempt failed. Retrying in {:?}...", delay);
            })
            .await
            .context(RetriesExhausted { attempts })
    }

    /// Fetches the status report and extracts the fields the check consumes.
    ///
    /// Extraction runs once, after the retry loop: a report that fetched and
    /// decoded cleanly but lacks a required field is malformed upstream
    /// data, and refetching would return the same document.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch exhausts its retries or the report is
    /// missing or corrupts a required field.
    pub async fn fetch_status(&self) -> Result<StatusSnapshot, ClientError> {
        let report = self.fetch_report().await?;
        StatusSnapshot::from_report(&report)
    }

    async fn fetch_report_once(&self) -> Result<Report, ClientError> {
        debug!(url = %self.url, "Requesting status document.");

        let response = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .context(Transport { url: self.url.clone() })?;

        // A response that made it back is not a transport failure, whatever
        // its status code; undecodable content is caught below.
        let body = response.text().await.context(Transport { url: self.url.clone() })?;

        let report = report::parse_report(&body, &self.key)?;
        debug!(records = report.len(), "Decoded status report.");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    use super::*;

    const KEY_HEX: &str = "cdc0cac1280b516e674f0057e4929bca84447cca8425007e33a88a5cf598a92e";

    const REPORT_BODY: &str = r#"[
        {"vartype":"status","varid":"dsl_link_status","varvalue":"online"},
        {"vartype":"value","varid":"dsl_downstream","varvalue":"100000"},
        {"vartype":"value","varid":"dsl_upstream","varvalue":"40000"},
        {"vartype":"status","varid":"firmware_version","varvalue":"050124.04.00.001"}
    ]"#;

    /// Serves `body` as an HTTP/1.1 200 response on a random local port,
    /// dropping the first `failures` connections without responding.
    async fn spawn_device(failures: usize, body: String) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut remaining = failures;
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(connection) => connection,
                    Err(_) => break,
                };

                if remaining > 0 {
                    remaining -= 1;
                    drop(socket);
                    continue;
                }

                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        port
    }

    fn test_config(port: u16) -> ClientConfig {
        ClientConfig::new("127.0.0.1", port, KEY_HEX)
            .with_request_timeout(Duration::from_secs(2))
            .with_retry_policy(3, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn plain_body_is_fetched_and_extracted() {
        let port = spawn_device(0, REPORT_BODY.to_string()).await;
        let client = DeviceClient::new(test_config(port)).unwrap();

        let status = client.fetch_status().await.unwrap();
        assert_eq!(status.link_status, "online");
        assert_eq!(status.downstream_kbit, 100_000);
        assert_eq!(status.upstream_kbit, 40_000);
        assert_eq!(status.firmware_version, "050124.04.00.001");
    }

    #[tokio::test]
    async fn encrypted_body_is_fetched_and_decrypted() {
        let key = crypto::decode_key(KEY_HEX).unwrap();
        let sealed = hex::encode(crypto::encrypt(REPORT_BODY.as_bytes(), &key).unwrap());

        let port = spawn_device(0, sealed).await;
        let client = DeviceClient::new(test_config(port)).unwrap();

        let status = client.fetch_status().await.unwrap();
        assert_eq!(status.downstream_kbit, 100_000);
    }

    #[tokio::test]
    async fn recovers_within_the_retry_budget() {
        let port = spawn_device(2, REPORT_BODY.to_string()).await;
        let client = DeviceClient::new(test_config(port)).unwrap();

        let status = client.fetch_status().await.unwrap();
        assert_eq!(status.link_status, "online");
    }

    #[tokio::test]
    async fn reports_exhaustion_after_the_last_attempt() {
        let port = spawn_device(usize::MAX, String::new()).await;
        let client = DeviceClient::new(test_config(port)).unwrap();

        match client.fetch_report().await {
            Err(ClientError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 4),
            other => panic!("expected retry exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_retried_then_reported() {
        // Bind and immediately drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = DeviceClient::new(test_config(port)).unwrap();
        let result = client.fetch_report().await;
        assert!(matches!(result, Err(ClientError::RetriesExhausted { .. })));
    }

    #[tokio::test]
    async fn undecodable_body_counts_as_a_failed_attempt() {
        let port = spawn_device(0, "<html>login required</html>".to_string()).await;
        let client = DeviceClient::new(test_config(port)).unwrap();

        match client.fetch_report().await {
            Err(ClientError::RetriesExhausted { source, .. }) => {
                assert!(matches!(*source, ClientError::UndecodablePayload { .. }));
            }
            other => panic!("expected retry exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn bad_key_fails_before_any_request() {
        let config = ClientConfig::new("127.0.0.1", 443, "not-hex");
        assert!(matches!(DeviceClient::new(config), Err(ClientError::InvalidKey { .. })));
    }
}
