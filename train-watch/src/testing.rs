//! In-memory collaborators for unit tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;

use crate::feed::{FeedError, FeedProvider, TripUpdate};
use crate::notify::{
    Clock, DeliveryChannel, DeliveryError, NotificationRecordSet, RecordError, RecordStore,
};

/// A clock stopped at 08:00 UTC on a given day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn on(date: NaiveDate) -> Self {
        let now = date.and_hms_opt(8, 0, 0).unwrap().and_utc();
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// Record store kept in memory; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<Mutex<Option<NotificationRecordSet>>>,
}

impl MemoryRecordStore {
    pub fn saved(&self) -> Option<NotificationRecordSet> {
        self.records.lock().unwrap().clone()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, today: NaiveDate) -> Result<Option<NotificationRecordSet>, RecordError> {
        Ok(self.saved().filter(|records| records.date == today))
    }

    fn save(&self, records: &NotificationRecordSet) -> Result<(), RecordError> {
        *self.records.lock().unwrap() = Some(records.clone());
        Ok(())
    }
}

/// Feed returning fixed updates, or failing when there are none.
pub struct StaticFeed {
    updates: Option<Vec<TripUpdate>>,
    fetches: Mutex<usize>,
}

impl StaticFeed {
    pub fn with_updates(updates: Vec<TripUpdate>) -> Self {
        Self {
            updates: Some(updates),
            fetches: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            updates: None,
            fetches: Mutex::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

impl FeedProvider for StaticFeed {
    fn fetch_trip_updates(&self) -> BoxFuture<'_, Result<Vec<TripUpdate>, FeedError>> {
        *self.fetches.lock().unwrap() += 1;
        let result = self.updates.clone().ok_or(FeedError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        });
        Box::pin(async move { result })
    }
}

/// Channel that records what it was asked to send.
#[derive(Clone)]
pub struct RecordingChannel {
    name: &'static str,
    enabled: bool,
    succeed: bool,
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingChannel {
    pub fn working(name: &'static str) -> Self {
        Self {
            name,
            enabled: true,
            succeed: true,
            sent: Arc::default(),
        }
    }

    pub fn broken(name: &'static str) -> Self {
        Self {
            succeed: false,
            ..Self::working(name)
        }
    }

    pub fn disabled(name: &'static str) -> Self {
        Self {
            enabled: false,
            ..Self::working(name)
        }
    }

    /// `(title, body)` pairs this channel was asked to send.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl DeliveryChannel for RecordingChannel {
    fn name(&self) -> &str {
        self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn send<'a>(&'a self, title: &'a str, body: &'a str) -> BoxFuture<'a, Result<(), DeliveryError>> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        let result = if self.succeed {
            Ok(())
        } else {
            Err(DeliveryError::Api {
                channel: "test",
                status: 500,
                message: "broken".to_string(),
            })
        };
        Box::pin(async move { result })
    }
}

/// A local HTTP server answering exactly one request with a canned response.
pub struct StubServer {
    url: String,
    request: tokio::task::JoinHandle<String>,
}

impl StubServer {
    /// Start serving `status` with `headers` and `body` on a loopback port.
    pub async fn respond(status: u16, headers: &[(&str, &str)], body: impl Into<Vec<u8>>) -> Self {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let body = body.into();
        let mut head = format!(
            "HTTP/1.1 {status} Stub\r\nContent-Length: {}\r\nConnection: close\r\n",
            body.len()
        );
        for (name, value) in headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");

        let request = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            stream.write_all(head.as_bytes()).await.unwrap();
            stream.write_all(&body).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        Self { url, request }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The raw request the server received, with header names lowercased.
    pub async fn request(self) -> String {
        let raw = self.request.await.unwrap();
        match raw.split_once("\r\n\r\n") {
            Some((head, body)) => format!("{}\r\n\r\n{body}", head.to_ascii_lowercase()),
            None => raw.to_ascii_lowercase(),
        }
    }
}

/// Whether `request` holds the full head and a body of the declared length.
fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some((head, body)) = text.split_once("\r\n\r\n") else {
        return false;
    };
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body.len() >= content_length
}
