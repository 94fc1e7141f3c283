//! In-memory feed reproducing the village forecast row layout.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::{collections::HashMap, time::Duration};

use crate::{
    category::{self, Category},
    error::ForecastError,
    feed::{FeedPage, ForecastItem, PageQuery, VillageFeed},
    grid::ROWS_PER_PAGE,
    kst,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Debug)]
pub struct SyntheticFeed {
    rows: Vec<ForecastItem>,
    delay: Option<Duration>,
    failing: bool,
    fetches: Mutex<HashMap<u32, usize>>,
}

impl SyntheticFeed {
    /// Feed starting at (`first_date`, `first_hour`) and covering `hours`
    /// consecutive forecast hours.
    pub fn new(first_date: NaiveDate, first_hour: u32, hours: usize) -> Self {
        let mut rows = Vec::new();
        let mut cursor = first_date.and_hms_opt(first_hour, 0, 0).unwrap();
        for _ in 0..hours {
            let hour = chrono::Timelike::hour(&cursor);
            for category in category::sequence_for(hour) {
                rows.push(Self::row(category, cursor.date(), hour));
            }
            cursor = kst::add_hours(cursor, 1).unwrap();
        }

        Self {
            rows,
            delay: None,
            failing: false,
            fetches: Mutex::new(HashMap::new()),
        }
    }

    /// Prepend rows the layout does not account for, dated at the first
    /// hour so the anchor stays put.
    pub fn with_leading_rows(mut self, count: usize) -> Self {
        if let Some(first) = self.rows.first().cloned() {
            let extra = (0..count).map(|_| ForecastItem {
                category: "XXX".to_string(),
                fcst_value: "0".to_string(),
                ..first.clone()
            });
            self.rows.splice(0..0, extra.collect::<Vec<_>>());
        }
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn value_for(category: Category, date: NaiveDate, hour: u32) -> String {
        match category {
            Category::Tmp => format!("{}", hour as i32 - 5),
            Category::Tmn => "-7".to_string(),
            Category::Tmx => "4.6".to_string(),
            Category::Pop => "30".to_string(),
            Category::Pty => "0".to_string(),
            Category::Sky => "3".to_string(),
            Category::Reh => "55".to_string(),
            Category::Wsd => "2.34".to_string(),
            Category::Pcp | Category::Sno => "강수없음".to_string(),
            other => format!("{}-{}-{hour:02}", other, kst::format_date(date)),
        }
    }

    fn row(category: Category, date: NaiveDate, hour: u32) -> ForecastItem {
        ForecastItem {
            category: category.as_str().to_string(),
            fcst_date: kst::format_date(date),
            fcst_time: kst::format_time(hour),
            fcst_value: Self::value_for(category, date, hour),
            base_date: "20240101".to_string(),
            base_time: "0200".to_string(),
            nx: 60,
            ny: 127,
        }
    }

    pub fn fetch_count(&self, page_no: u32) -> usize {
        self.fetches.lock().get(&page_no).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().values().sum()
    }
}

#[async_trait]
impl VillageFeed for SyntheticFeed {
    async fn fetch_page(&self, query: &PageQuery) -> Result<FeedPage, ForecastError> {
        *self.fetches.lock().entry(query.page_no).or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(ForecastError::HttpStatus {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }

        let start = (query.page_no as usize - 1) * ROWS_PER_PAGE;
        let items = self
            .rows
            .iter()
            .skip(start)
            .take(ROWS_PER_PAGE)
            .cloned()
            .collect();

        Ok(FeedPage {
            items,
            total_count: Some(self.rows.len()),
        })
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<chrono::DateTime<chrono::Utc>>,
}

impl ManualClock {
    pub fn at_kst(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> Self {
        Self {
            now: Mutex::new(kst::from_kst(kst::civil(y, m, d, hh, mm).unwrap())),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock() += by;
    }
}

impl kst::Clock for ManualClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        *self.now.lock()
    }
}
