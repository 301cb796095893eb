//! Per-source usage quota.
//!
//! Day-bucketed counter keyed by request source (client IP). Quota is
//! consumed before the pipeline runs; a retried attempt inside one
//! request costs no extra quota.

use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

pub struct QuotaStore {
    daily_limit: u32,
    counts: Mutex<HashMap<String, (NaiveDate, u32)>>,
}

impl QuotaStore {
    pub fn new(daily_limit: u32) -> Self {
        Self {
            daily_limit,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Consume one unit for `source`. Returns false once the daily
    /// limit is reached; the counter resets at the next UTC day.
    pub async fn try_consume(&self, source: &str) -> bool {
        self.consume_on(Utc::now().date_naive(), source).await
    }

    async fn consume_on(&self, today: NaiveDate, source: &str) -> bool {
        let mut counts = self.counts.lock().await;
        let entry = counts.entry(source.to_string()).or_insert((today, 0));
        if entry.0 != today {
            *entry = (today, 0);
        }
        if entry.1 >= self.daily_limit {
            return false;
        }
        entry.1 += 1;
        true
    }
}
