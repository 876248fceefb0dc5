//! In-process fakes for unit tests

use crate::error::{Error, Result};
use crate::http::{Envelope, Timer, Transport};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

pub(crate) const BASE: &str = "https://api.test";

#[derive(Debug, Clone)]
enum Scripted {
    Respond(Envelope),
    Fail(String),
}

/// Transport answering from per-(path, page) scripts.
///
/// Each route holds a queue; the last entry repeats once the queue is down
/// to one. Unscripted routes answer 404.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, path: &str, page: Option<u32>, envelope: Envelope) {
        self.push(route_key(path, page), Scripted::Respond(envelope));
    }

    pub(crate) fn fail(&self, path: &str, page: Option<u32>, message: &str) {
        self.push(route_key(path, page), Scripted::Fail(message.to_string()));
    }

    fn push(&self, key: String, entry: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push_back(entry);
    }

    pub(crate) fn calls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn pages_requested(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .calls()
            .iter()
            .filter_map(|url| page_param(url))
            .collect();
        pages.sort_unstable();
        pages
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url, _headers: &HeaderMap) -> Result<Envelope> {
        self.calls.lock().unwrap().push(url.clone());
        tokio::task::yield_now().await;

        let key = route_key(url.path(), page_param(url));
        let entry = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match entry {
            Some(Scripted::Respond(envelope)) => Ok(envelope),
            Some(Scripted::Fail(message)) => Err(Error::transport(message)),
            None => Ok(Envelope::new(404, json!({"message": "Not Found"}))),
        }
    }
}

fn route_key(path: &str, page: Option<u32>) -> String {
    let path = path.trim_start_matches('/');
    match page {
        Some(page) => format!("{path}#{page}"),
        None => path.to_string(),
    }
}

fn page_param(url: &Url) -> Option<u32> {
    url.query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
}

/// Timer that records requested sleeps and returns immediately
#[derive(Debug, Default)]
pub(crate) struct RecordingTimer {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingTimer {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Timer for RecordingTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// `count` records with ids starting at `first_id`
pub(crate) fn records(first_id: usize, count: usize) -> Value {
    Value::Array(
        (first_id..first_id + count)
            .map(|id| json!({"id": id, "login": format!("user{id}"), "site_admin": false}))
            .collect(),
    )
}

/// `Link` header for a page with the given next/last pages
pub(crate) fn link_header(path: &str, next: u32, last: u32) -> String {
    format!(
        r#"<{BASE}/{path}?per_page=100&page={next}>; rel="next", <{BASE}/{path}?per_page=100&page={last}>; rel="last""#
    )
}

/// 200 response with a quota snapshot
pub(crate) fn ok(body: Value) -> Envelope {
    Envelope::new(200, body)
        .with_header("X-RateLimit-Limit", "5000")
        .with_header("X-RateLimit-Remaining", "4999")
}

/// 403 response with an exhausted quota
pub(crate) fn exhausted() -> Envelope {
    Envelope::new(403, json!({"message": "API rate limit exceeded"}))
        .with_header("X-RateLimit-Limit", "60")
        .with_header("X-RateLimit-Remaining", "0")
}
