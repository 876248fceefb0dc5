//! Progress event types

use crate::error::Result;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Incremental report emitted after each page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// On the first page the next page number; afterwards the number of
    /// pages completed so far
    pub next_page: Option<u32>,
    /// Total number of pages, when known
    pub total_pages: Option<u32>,
    /// Page size
    pub per_page: usize,
    /// Records added since the previous report
    pub data: Vec<Record>,
}

impl ProgressReport {
    /// Report for a collection served from cache: `(0, 0, N)` with every record
    pub fn cached(records: &[Record]) -> Self {
        Self {
            next_page: Some(0),
            total_pages: Some(0),
            per_page: records.len(),
            data: records.to_vec(),
        }
    }

    /// Number of records in this report
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the report carries no records
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Consumer's answer to a progress report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Control {
    /// Keep going
    #[default]
    Continue,
    /// Abort the download
    Stop,
}

impl Control {
    /// Check if this is a stop request
    pub fn should_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// One item of a download's event stream
#[derive(Debug)]
pub enum Event<T> {
    /// Intermediate progress
    Progress(Progress),
    /// Terminal outcome; nothing follows it
    Finished(Result<T>),
}

/// A delivered progress report, with an optional reply slot
///
/// Dropping it without calling [`Progress::respond`] answers `Continue`.
#[derive(Debug)]
pub struct Progress {
    report: ProgressReport,
    reply: Option<oneshot::Sender<Control>>,
}

impl Progress {
    pub(crate) fn new(report: ProgressReport, reply: Option<oneshot::Sender<Control>>) -> Self {
        Self { report, reply }
    }

    /// The report
    pub fn report(&self) -> &ProgressReport {
        &self.report
    }

    /// Take the report, answering `Continue`
    pub fn into_report(self) -> ProgressReport {
        self.report
    }

    /// Check if the producer is waiting for an answer
    pub fn wants_reply(&self) -> bool {
        self.reply.is_some()
    }

    /// Answer the producer. Ignored when no answer was asked for.
    pub fn respond(mut self, control: Control) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(control);
        }
    }
}
