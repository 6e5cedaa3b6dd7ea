//! HTTP client for the reachability backend.

use super::AnalysisSource;
use crate::error::{ClientErrorKind, ErrorContext, MatrixError, OptionContext, Result};
use crate::model::wire::{
    AnalysisPayload, ErrorBody, GraphPayload, NamespacesResponse, PolicyDetails, ResourceDetails,
};
use crate::model::{AnalysisResult, PairKey, ResourceType};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the backend (scheme, host, optional path prefix)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retries for transient failures (network errors, 5xx, 429).
    /// Applies to catalog, namespace and detail loads only.
    pub max_retries: u8,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 0,
        }
    }
}

/// Blocking HTTP implementation of [`AnalysisSource`].
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    base: Url,
    config: HttpClientConfig,
}

fn network_error(context: &str, err: &reqwest::Error) -> MatrixError {
    MatrixError::network(context, err.to_string())
}

pub(super) fn user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}

impl HttpAnalysisClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let base = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent())
            .build()
            .map_err(|e| network_error("Failed to create HTTP client", &e))?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL joined with path segments, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| MatrixError::config(format!("cannot use '{}' as a base URL", self.base)))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        context: &str,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // 250ms, 500ms, 1s, ...
                let delay = Duration::from_millis(250 << (attempt - 1).min(4));
                tracing::debug!("Retry attempt {} after {:?}", attempt, delay);
                std::thread::sleep(delay);
            }

            match self.send_once(context, url.clone(), query) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let transient = e.client_kind().is_some_and(ClientErrorKind::is_transient);
                    tracing::debug!("{} attempt {} failed: {}", context, attempt + 1, e);
                    last_error = Some(e);
                    if !transient {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MatrixError::network(context, "no attempt made")))
    }

    /// Single request without retries.
    fn send_once<T: DeserializeOwned>(
        &self,
        context: &str,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| network_error(context, &e))?;
        decode_response(context, response)
    }
}

/// Parse and sanity-check a base URL.
pub(super) fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| MatrixError::config(format!("invalid server URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(MatrixError::config(format!(
            "unsupported URL scheme '{other}' in '{raw}'"
        ))),
    }
}

/// Map a response to a typed value or a typed failure.
fn decode_response<T: DeserializeOwned>(context: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        let message = error_message(&body);
        let kind = if status.as_u16() == 404 {
            ClientErrorKind::ResourceNotFound(message)
        } else {
            ClientErrorKind::HttpError {
                status: status.as_u16(),
                body: message,
            }
        };
        return Err(MatrixError::client(context, kind));
    }

    let body = response
        .text()
        .map_err(|e| network_error(context, &e))?;
    decode_body(context, &body)
}

/// Decode a 2xx body; shape mismatches are `MalformedResponse`.
fn decode_body<T: DeserializeOwned>(context: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).context(context)
}

/// The backend's `{"error": ...}` message, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

impl AnalysisSource for HttpAnalysisClient {
    fn fetch_graph(&self, resource_type: ResourceType) -> Result<GraphPayload> {
        let url = self.endpoint(&["data"])?;
        self.get_json(
            "loading resource graph",
            url,
            &[("resource_type", resource_type.as_str())],
        )
    }

    fn check_communication(&self, key: &PairKey) -> Result<AnalysisResult> {
        // a failed pair is retried by activating the cell again
        let url = self.endpoint(&["check-communication"])?;
        let payload: AnalysisPayload = self.send_once(
            &format!("checking {key}"),
            url,
            &[
                ("source", key.source.as_str()),
                ("target", key.target.as_str()),
                ("resource_type", key.resource_type.as_str()),
            ],
        )?;
        Ok(AnalysisResult::from(payload))
    }

    fn namespaces(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["namespaces"])?;
        let response: NamespacesResponse = self.get_json("listing namespaces", url, &[])?;
        Ok(response.namespaces)
    }

    fn policy(&self, name: &str) -> Result<PolicyDetails> {
        let url = self.endpoint(&["policy", name])?;
        self.get_json(&format!("fetching policy {name}"), url, &[])
    }

    fn resource(&self, resource_type: ResourceType, id: &str) -> Result<ResourceDetails> {
        let (namespace, name) = id
            .split_once('/')
            .with_context_none(|| format!("resource id '{id}' is not namespace/name"))?;
        let url = self.endpoint(&["resource", resource_type.as_str(), namespace, name])?;
        self.get_json(&format!("fetching {resource_type} {id}"), url, &[])
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Local backend answering every request with one canned response.
    fn serve(status: u16, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                let mut line = String::new();
                while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{addr}"), hits)
    }

    fn client_with_retries(base: &str, max_retries: u8) -> HttpAnalysisClient {
        HttpAnalysisClient::new(HttpClientConfig {
            base_url: base.to_string(),
            timeout: Duration::from_secs(5),
            max_retries,
        })
        .expect("client")
    }

    fn pair() -> PairKey {
        PairKey::new("default/web", "default/db", ResourceType::Deployment)
    }

    fn client(base: &str) -> HttpAnalysisClient {
        HttpAnalysisClient::new(HttpClientConfig {
            base_url: base.to_string(),
            ..HttpClientConfig::default()
        })
        .expect("client")
    }

    #[test]
    fn test_config_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:5000");
        assert_eq!(
            c.endpoint(&["data"]).expect("url").as_str(),
            "http://localhost:5000/data"
        );

        let prefixed = client("http://example.com/netpol/");
        assert_eq!(
            prefixed
                .endpoint(&["resource", "pod", "default", "web-0"])
                .expect("url")
                .as_str(),
            "http://example.com/netpol/resource/pod/default/web-0"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let c = client("http://localhost:5000");
        let url = c.endpoint(&["policy", "a b/c"]).expect("url");
        assert_eq!(url.as_str(), "http://localhost:5000/policy/a%20b%2Fc");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://host").is_err());
        assert!(parse_base_url(" https://host:8443 ").is_ok());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "Failed to connect to Kubernetes cluster"}"#),
            "Failed to connect to Kubernetes cluster"
        );
        assert_eq!(error_message(" plain text \n"), "plain text");
    }

    #[test]
    fn test_resource_requires_namespaced_id() {
        let c = client("http://localhost:5000");
        let err = c.resource(ResourceType::Pod, "no-namespace").unwrap_err();
        assert!(matches!(err, MatrixError::Validation(_)));
    }

    #[test]
    fn test_unreachable_backend_is_network_failure() {
        // port 9 (discard) on localhost is closed in test environments
        let c = HttpAnalysisClient::new(HttpClientConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_millis(500),
            max_retries: 0,
        })
        .expect("client");
        let err = c.namespaces().unwrap_err();
        assert!(matches!(
            err.client_kind(),
            Some(ClientErrorKind::NetworkFailure(_))
        ));
    }

    #[test]
    fn test_decode_body_rejects_wrong_shape() {
        let err = decode_body::<GraphPayload>("loading graph", r#"{"error": "cluster unreachable"}"#)
            .unwrap_err();
        assert!(matches!(
            err.client_kind(),
            Some(ClientErrorKind::MalformedResponse(_))
        ));
        assert!(decode_body::<AnalysisPayload>("checking", r#"{"error": "boom"}"#).is_err());
    }

    #[test]
    fn test_graph_without_nodes_is_malformed() {
        let (base, _hits) = serve(200, r#"{"error": "cluster unreachable"}"#);
        let err = client_with_retries(&base, 0)
            .fetch_graph(ResourceType::Deployment)
            .unwrap_err();
        assert!(matches!(
            err.client_kind(),
            Some(ClientErrorKind::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_analysis_without_allowed_is_malformed() {
        let (base, _hits) = serve(200, r#"{"error": "boom"}"#);
        let err = client_with_retries(&base, 0)
            .check_communication(&pair())
            .unwrap_err();
        assert!(matches!(
            err.client_kind(),
            Some(ClientErrorKind::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_pair_check_is_sent_once() {
        let (base, hits) = serve(500, r#"{"error": "analysis crashed"}"#);
        let err = client_with_retries(&base, 2)
            .check_communication(&pair())
            .unwrap_err();
        assert_eq!(
            err.client_kind(),
            Some(&ClientErrorKind::HttpError {
                status: 500,
                body: "analysis crashed".into()
            })
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_graph_load_retries_transient_failures() {
        let (base, hits) = serve(503, "busy");
        assert!(client_with_retries(&base, 1)
            .fetch_graph(ResourceType::Pod)
            .is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let (base, hits) = serve(503, "busy");
        assert!(client_with_retries(&base, 0).namespaces().is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
