//! Process-wide summary cache with lazy expiry.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

use crate::{base_time::ForecastDay, summary::WeatherSummary};

pub const DEFAULT_TTL_MINUTES: i64 = 15;

type CacheKey = (String, ForecastDay);

#[derive(Debug, Clone)]
struct CacheEntry {
    summary: Arc<WeatherSummary>,
    expires_at: DateTime<Utc>,
}

/// Summaries keyed by (location, forecast day).
///
/// Expired entries are never swept; they are ignored on lookup and
/// replaced by the next insert for the same key.
#[derive(Debug)]
pub struct SummaryCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
    }
}

impl SummaryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(
        &self,
        location_id: &str,
        day: ForecastDay,
        now: DateTime<Utc>,
    ) -> Option<Arc<WeatherSummary>> {
        let entries = self.entries.lock();
        let entry = entries.get(&(location_id.to_string(), day))?;
        if entry.expires_at > now {
            debug!(location_id, %day, "weather summary cache hit");
            Some(Arc::clone(&entry.summary))
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        location_id: &str,
        day: ForecastDay,
        summary: Arc<WeatherSummary>,
        now: DateTime<Utc>,
    ) {
        let entry = CacheEntry {
            summary,
            expires_at: now + self.ttl,
        };
        self.entries
            .lock()
            .insert((location_id.to_string(), day), entry);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
