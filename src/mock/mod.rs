//! Served mock records.

pub mod store;
pub mod synthesize;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status served when a record does not set one.
pub const DEFAULT_STATUS: u16 = 200;

/// One served response, keyed by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockRecord {
    /// Request URL the record answers.
    pub url: String,
    /// Response status; 200 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
    /// Delay before answering, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// JSON body.
    pub response: Value,
}

impl MockRecord {
    /// Creates a record with default status and no delay.
    pub fn new(url: impl Into<String>, response: Value) -> Self {
        Self { url: url.into(), http_code: None, timeout: None, response }
    }

    /// Status code to answer with.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.http_code.unwrap_or(DEFAULT_STATUS)
    }

    /// Simulated latency, if any.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        self.timeout.filter(|ms| *ms > 0).map(Duration::from_millis)
    }
}

/// Every served record, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MockSnapshot {
    /// Records in order; the first one wins on duplicate URLs.
    pub records: Vec<MockRecord>,
}

impl MockSnapshot {
    /// Wraps a list of records.
    #[must_use]
    pub fn new(records: Vec<MockRecord>) -> Self {
        Self { records }
    }

    /// First record whose URL equals `url`.
    #[must_use]
    pub fn find(&self, url: &str) -> Option<&MockRecord> {
        self.records.iter().find(|record| record.url == url)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
