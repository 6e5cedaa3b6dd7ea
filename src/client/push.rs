//! Server-sent push updates (`update_{resource_type}` events).

use super::dispatcher::{BackgroundEvent, PushStatus};
use super::http::{parse_base_url, user_agent};
use crate::error::{MatrixError, Result};
use crate::model::wire::GraphPayload;
use crate::model::ResourceType;
use reqwest::blocking::Client;
use reqwest::Url;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Event name prefix carrying a fresh graph payload.
const UPDATE_PREFIX: &str = "update_";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental `text/event-stream` line decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its terminator). A blank line dispatches.
    pub fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry are not used
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

/// A decoded `update_{type}` event.
#[derive(Debug, Clone, PartialEq)]
pub struct PushUpdate {
    pub resource_type: ResourceType,
    pub payload: GraphPayload,
}

impl PushUpdate {
    /// Decode an event. `Ok(None)` for events that are not updates.
    pub fn from_event(event: &SseEvent) -> Result<Option<Self>> {
        let Some(kind) = event.event.strip_prefix(UPDATE_PREFIX) else {
            return Ok(None);
        };
        let resource_type: ResourceType = kind
            .parse()
            .map_err(|e: String| MatrixError::malformed("push event name", e))?;
        let payload: GraphPayload = serde_json::from_str(&event.data)
            .map_err(|e| MatrixError::malformed(format!("push event {}", event.event), e.to_string()))?;
        Ok(Some(Self {
            resource_type,
            payload,
        }))
    }
}

/// Exponential reconnect delay: 1s, 2s, 4s, ... capped.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait now; doubles the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Background reader for the push channel.
///
/// Attach once; the thread reconnects on its own until shut down.
#[derive(Debug)]
pub struct PushListener {
    url: Url,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PushListener {
    /// `path` is appended to the base URL's own path, like backend endpoints.
    pub fn new(base_url: &str, path: &str) -> Result<Self> {
        let mut url = parse_base_url(base_url)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| MatrixError::config(format!("cannot use '{base_url}' as a base URL")))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(Self {
            url,
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: None,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Start the reader thread. A second call is refused.
    pub fn attach(&mut self, tx: Sender<BackgroundEvent>) -> bool {
        if self.handle.is_some() {
            tracing::warn!(url = %self.url, "push channel already attached; ignoring");
            return false;
        }
        let url = self.url.clone();
        let shutdown = Arc::clone(&self.shutdown);
        match std::thread::Builder::new()
            .name("push-listener".into())
            .spawn(move || listen(&url, &shutdown, &tx))
        {
            Ok(handle) => {
                self.handle = Some(handle);
                true
            }
            Err(e) => {
                tracing::warn!("failed to start push listener: {e}");
                false
            }
        }
    }

    /// Ask the reader thread to stop. It exits at its next wakeup.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

impl Drop for PushListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn listen(url: &Url, shutdown: &AtomicBool, tx: &Sender<BackgroundEvent>) {
    let client = match Client::builder()
        .timeout(None::<Duration>)
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent())
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("push listener disabled: {e}");
            return;
        }
    };

    let mut backoff = Backoff::default();
    while !shutdown.load(Ordering::SeqCst) {
        match read_stream(&client, url, shutdown, tx, &mut backoff) {
            Ok(()) => tracing::info!(%url, "push stream closed by server"),
            Err(e) => tracing::warn!(%url, "push stream failed: {e}"),
        }
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let delay = backoff.next_delay();
        if tx
            .send(BackgroundEvent::Push(PushStatus::Reconnecting(delay)))
            .is_err()
        {
            return;
        }
        sleep_unless_shutdown(delay, shutdown);
    }
    tracing::debug!("push listener stopped");
}

fn read_stream(
    client: &Client,
    url: &Url,
    shutdown: &AtomicBool,
    tx: &Sender<BackgroundEvent>,
    backoff: &mut Backoff,
) -> Result<()> {
    let response = client
        .get(url.clone())
        .header("Accept", "text/event-stream")
        .send()
        .map_err(|e| MatrixError::network("connecting push stream", e.to_string()))?;
    if !response.status().is_success() {
        return Err(MatrixError::network(
            "connecting push stream",
            format!("HTTP {}", response.status().as_u16()),
        ));
    }

    backoff.reset();
    tracing::info!(%url, "push stream connected");
    let _ = tx.send(BackgroundEvent::Push(PushStatus::Connected));

    let mut decoder = SseDecoder::new();
    for line in BufReader::new(response).lines() {
        if shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }
        let line = line.map_err(|e| MatrixError::network("reading push stream", e.to_string()))?;
        let Some(event) = decoder.push_line(&line) else {
            continue;
        };
        match PushUpdate::from_event(&event) {
            Ok(Some(update)) => {
                tracing::debug!(
                    resource_type = %update.resource_type,
                    nodes = update.payload.nodes.len(),
                    "push update received"
                );
                if tx.send(BackgroundEvent::Update(update)).is_err() {
                    return Ok(());
                }
            }
            Ok(None) => tracing::debug!(event = %event.event, "ignoring push event"),
            Err(e) => tracing::warn!("dropping push event: {e}"),
        }
    }
    Ok(())
}

fn sleep_unless_shutdown(total: Duration, shutdown: &AtomicBool) {
    let slice = Duration::from_millis(100);
    let mut waited = Duration::ZERO;
    while waited < total && !shutdown.load(Ordering::SeqCst) {
        std::thread::sleep(slice);
        waited += slice;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientErrorKind;

    fn decode_all(input: &str) -> Vec<SseEvent> {
        let mut decoder = SseDecoder::new();
        input.lines().filter_map(|l| decoder.push_line(l)).collect()
    }

    #[test]
    fn test_multiline_data_and_comments() {
        let events = decode_all(
            ": keep-alive\n\
             event: update_pod\n\
             data: {\"nodes\": [],\n\
             data:  \"edges\": []}\n\
             \n",
        );
        assert_eq!(
            events,
            vec![SseEvent {
                event: "update_pod".into(),
                data: "{\"nodes\": [],\n \"edges\": []}".into(),
            }]
        );
    }

    #[test]
    fn test_default_event_name_and_crlf() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push_line("data: hello\r").is_none());
        let event = decoder.push_line("\r").expect("dispatch");
        assert_eq!(event.event, "message");
        assert_eq!(event.data, "hello");
    }

    #[test]
    fn test_blank_line_without_data_dispatches_nothing() {
        let mut decoder = SseDecoder::new();
        decoder.push_line("event: update_pod");
        assert!(decoder.push_line("").is_none());
        // event name does not leak into the next event
        decoder.push_line("data: x");
        assert_eq!(decoder.push_line("").map(|e| e.event), Some("message".into()));
    }

    #[test]
    fn test_push_update_decode() {
        let event = SseEvent {
            event: "update_deployment".into(),
            data: r#"{"nodes":[{"data":{"id":"default/web","label":"web","group":"deployment"}}],"edges":[]}"#.into(),
        };
        let update = PushUpdate::from_event(&event).expect("ok").expect("update");
        assert_eq!(update.resource_type, ResourceType::Deployment);
        assert_eq!(update.payload.nodes.len(), 1);

        let other = SseEvent {
            event: "heartbeat".into(),
            data: "{}".into(),
        };
        assert!(PushUpdate::from_event(&other).expect("ok").is_none());

        let bad = SseEvent {
            event: "update_service".into(),
            data: "{}".into(),
        };
        assert!(PushUpdate::from_event(&bad).is_err());
    }

    #[test]
    fn test_update_without_nodes_is_malformed() {
        let event = SseEvent {
            event: "update_deployment".into(),
            data: r#"{"edges": []}"#.into(),
        };
        let err = PushUpdate::from_event(&event).unwrap_err();
        assert!(matches!(
            err.client_kind(),
            Some(ClientErrorKind::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let mut backoff = Backoff::default();
        let delays: Vec<u64> = (0..7).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30]);
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_listener_url_keeps_base_path() {
        let url = |base: &str, path: &str| {
            PushListener::new(base, path)
                .expect("listener")
                .url()
                .as_str()
                .to_string()
        };
        assert_eq!(url("http://host/netpol", "/events"), "http://host/netpol/events");
        assert_eq!(url("http://host/netpol/", "events"), "http://host/netpol/events");
        assert_eq!(url("http://host:5000", "/stream/events"), "http://host:5000/stream/events");
    }

    #[test]
    fn test_listener_url_and_single_attach() {
        let mut listener =
            PushListener::new("http://127.0.0.1:9/prefix/", "/events").expect("listener");
        assert_eq!(listener.url().as_str(), "http://127.0.0.1:9/prefix/events");

        let (tx, _rx) = std::sync::mpsc::channel();
        assert!(listener.attach(tx.clone()));
        assert!(!listener.attach(tx));
        listener.shutdown();
    }
}
