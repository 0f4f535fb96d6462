use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub month: String,
    pub articles_generated: u64,
    pub api_calls: u64,
    pub words_generated: u64,
}

impl UsageReport {
    fn empty(month: String) -> Self {
        Self {
            month,
            articles_generated: 0,
            api_calls: 0,
            words_generated: 0,
        }
    }
}

/// Process-lifetime usage counters for the current calendar month.
#[derive(Debug)]
pub struct UsageTracker {
    inner: Mutex<UsageReport>,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(UsageReport::empty(current_month())),
        }
    }

    fn update(&self, f: impl FnOnce(&mut UsageReport)) {
        let month = current_month();
        let mut report = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if report.month != month {
            *report = UsageReport::empty(month);
        }
        f(&mut report);
    }

    pub fn record_api_call(&self) {
        self.update(|r| r.api_calls += 1);
    }

    pub fn record_words(&self, words: usize) {
        self.update(|r| r.words_generated += words as u64);
    }

    pub fn record_article(&self) {
        self.update(|r| r.articles_generated += 1);
    }

    pub fn snapshot(&self) -> UsageReport {
        let mut snapshot = None;
        self.update(|r| snapshot = Some(r.clone()));
        snapshot.unwrap_or_else(|| UsageReport::empty(current_month()))
    }
}
