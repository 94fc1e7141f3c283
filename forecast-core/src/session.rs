//! Per-request fetch session: page and value memoization on top of the feed.

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{
    base_time::BaseDateTime,
    category::Category,
    error::ForecastError,
    feed::{ForecastItem, PageQuery, VillageFeed},
    grid::{self, ForecastAnchor, ROWS_PER_PAGE},
    kst,
};

type PageSlot = Arc<OnceCell<Arc<Vec<ForecastItem>>>>;
type ValueKey = (Category, NaiveDate, u32);

/// Caches scoped to one weather resolution.
///
/// Every page is requested from the feed at most once per session, even
/// when several lookups ask for it concurrently: later callers wait on the
/// first caller's request.
#[derive(Debug)]
pub struct ForecastSession<'a> {
    feed: &'a dyn VillageFeed,
    base: BaseDateTime,
    nx: i32,
    ny: i32,
    pages: Mutex<HashMap<u32, PageSlot>>,
    values: Mutex<HashMap<ValueKey, Option<String>>>,
    anchor: OnceLock<ForecastAnchor>,
    total_rows: OnceLock<usize>,
}

impl<'a> ForecastSession<'a> {
    pub fn new(feed: &'a dyn VillageFeed, base: BaseDateTime, nx: i32, ny: i32) -> Self {
        Self {
            feed,
            base,
            nx,
            ny,
            pages: Mutex::new(HashMap::new()),
            values: Mutex::new(HashMap::new()),
            anchor: OnceLock::new(),
            total_rows: OnceLock::new(),
        }
    }

    pub fn base(&self) -> BaseDateTime {
        self.base
    }

    /// Rows of page `page_no`, fetched on first use.
    pub async fn fetch_page(&self, page_no: u32) -> Result<Arc<Vec<ForecastItem>>, ForecastError> {
        let slot = self.pages.lock().entry(page_no).or_default().clone();
        let items = slot.get_or_try_init(|| self.load_page(page_no)).await?;
        Ok(Arc::clone(items))
    }

    async fn load_page(&self, page_no: u32) -> Result<Arc<Vec<ForecastItem>>, ForecastError> {
        let query = PageQuery {
            page_no,
            base: self.base,
            nx: self.nx,
            ny: self.ny,
        };
        let page = self.feed.fetch_page(&query).await?;

        if self.anchor.get().is_none() {
            let first = page.items.first().ok_or(ForecastError::NoData)?;
            let anchor = anchor_from(first)?;
            debug!(
                first_date = %anchor.first_date,
                first_hour = anchor.first_hour,
                "captured forecast anchor"
            );
            let _ = self.anchor.set(anchor);
            if let Some(total) = page.total_count {
                let _ = self.total_rows.set(total);
            }
        }

        Ok(Arc::new(page.items))
    }

    /// First (date, hour) of the feed, fetching page 1 if still unknown.
    pub async fn anchor(&self) -> Result<ForecastAnchor, ForecastError> {
        if let Some(anchor) = self.anchor.get() {
            return Ok(*anchor);
        }
        self.fetch_page(1).await?;
        self.anchor.get().copied().ok_or(ForecastError::NoData)
    }

    /// Raw feed value of (category, date, hour), `None` when the feed does
    /// not hold it where the grid says it should be.
    pub async fn get_value(
        &self,
        category: Category,
        date: NaiveDate,
        hour: u32,
    ) -> Result<Option<String>, ForecastError> {
        let key = (category, date, hour);
        let cached = self.values.lock().get(&key).cloned();
        if let Some(value) = cached {
            return Ok(value);
        }

        let anchor = self.anchor().await?;
        let value = match grid::index_of(&anchor, category, date, hour) {
            Some(index) => self.search(index, category, date, hour).await?,
            None => None,
        };

        if value.is_none() {
            debug!(%category, %date, hour, "forecast value unresolved");
        }
        self.values.lock().insert(key, value.clone());
        Ok(value)
    }

    async fn search(
        &self,
        index: usize,
        category: Category,
        date: NaiveDate,
        hour: u32,
    ) -> Result<Option<String>, ForecastError> {
        let fcst_date = kst::format_date(date);
        let fcst_time = kst::format_time(hour);

        for page_no in grid::candidate_pages(index) {
            if self.past_last_page(page_no) {
                continue;
            }
            let items = self.fetch_page(page_no).await?;
            if let Some(item) = items
                .iter()
                .find(|item| item.matches(category.as_str(), &fcst_date, &fcst_time))
            {
                return Ok(Some(item.fcst_value.clone()));
            }
        }

        Ok(None)
    }

    fn past_last_page(&self, page_no: u32) -> bool {
        self.total_rows
            .get()
            .is_some_and(|&total| page_no as usize > total.div_ceil(ROWS_PER_PAGE))
    }

    /// Number of distinct pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
            .lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }
}

fn anchor_from(item: &ForecastItem) -> Result<ForecastAnchor, ForecastError> {
    let first_date = kst::parse_date(&item.fcst_date).ok_or_else(|| {
        ForecastError::Malformed(format!("invalid fcstDate '{}'", item.fcst_date))
    })?;
    let first_hour = kst::parse_hour(&item.fcst_time).ok_or_else(|| {
        ForecastError::Malformed(format!("invalid fcstTime '{}'", item.fcst_time))
    })?;
    Ok(ForecastAnchor::new(first_date, first_hour))
}

/// Numeric value of a raw feed string.
///
/// Blank, `-`, `null` and the "no precipitation" marker carry no number.
pub fn parse_value(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if matches!(trimmed, "" | "-" | "null" | "강수없음") {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
