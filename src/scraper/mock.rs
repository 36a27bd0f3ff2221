// Scripted transport for tests
use crate::model::FetchError;
use crate::scraper::traits::{HttpResponse, HttpTransport};

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Page { status: u16, body: String },
    Timeout,
    Connection(String),
}

/// Answers from a fixed url -> reply table and counts every call.
/// Unknown urls answer 404.
#[derive(Default)]
pub struct MockTransport {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
    requested: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.replies.insert(
            url.to_string(),
            Reply::Page {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn with_timeout(mut self, url: &str) -> Self {
        self.replies.insert(url.to_string(), Reply::Timeout);
        self
    }

    pub fn with_connection_error(mut self, url: &str, reason: &str) -> Self {
        self.replies
            .insert(url.to_string(), Reply::Connection(reason.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn last_headers(&self) -> Vec<(String, String)> {
        self.requested
            .lock()
            .unwrap()
            .last()
            .map(|(_, headers)| headers.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap()
            .push((url.to_string(), headers.to_vec()));

        match self.replies.get(url).cloned() {
            Some(Reply::Page { status, body }) => Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            }),
            Some(Reply::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }),
            Some(Reply::Connection(reason)) => Err(FetchError::Connection {
                url: url.to_string(),
                reason,
            }),
            None => Ok(HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: String::new(),
            }),
        }
    }
}
