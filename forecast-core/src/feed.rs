//! Client for the village forecast feed.

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, time::Duration};
use tracing::{debug, instrument};

use crate::{base_time::BaseDateTime, error::ForecastError, grid::ROWS_PER_PAGE};

pub const VILLAGE_FORECAST_ENDPOINT: &str =
    "https://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getVilageFcst";

const SUCCESS_CODE: &str = "00";

/// One row of the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastItem {
    pub category: String,
    pub fcst_date: String,
    pub fcst_time: String,
    pub fcst_value: String,
    #[serde(default)]
    pub base_date: String,
    #[serde(default)]
    pub base_time: String,
    #[serde(default)]
    pub nx: i32,
    #[serde(default)]
    pub ny: i32,
}

impl ForecastItem {
    pub fn matches(&self, category: &str, fcst_date: &str, fcst_time: &str) -> bool {
        self.category == category && self.fcst_date == fcst_date && self.fcst_time == fcst_time
    }
}

/// Parameters of a single page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page_no: u32,
    pub base: BaseDateTime,
    pub nx: i32,
    pub ny: i32,
}

/// Rows of one page plus the feed's reported total row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub items: Vec<ForecastItem>,
    pub total_count: Option<usize>,
}

/// Source of feed pages.
#[async_trait]
pub trait VillageFeed: Send + Sync + Debug {
    async fn fetch_page(&self, query: &PageQuery) -> Result<FeedPage, ForecastError>;
}

#[derive(Debug, Clone)]
pub struct KmaClient {
    service_key: String,
    endpoint: String,
    http: Client,
}

impl KmaClient {
    pub fn new(service_key: String) -> Result<Self, ForecastError> {
        Self::with_endpoint(service_key, VILLAGE_FORECAST_ENDPOINT.to_string())
    }

    pub fn with_endpoint(service_key: String, endpoint: String) -> Result<Self, ForecastError> {
        if service_key.trim().is_empty() {
            return Err(ForecastError::Configuration(
                "Forecast service key is empty".to_string(),
            ));
        }

        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            service_key,
            endpoint,
            http,
        })
    }

    /// Endpoint with the service key attached.
    ///
    /// Portal keys are handed out both raw and already percent-encoded; an
    /// encoded key is passed through untouched.
    fn keyed_url(&self) -> String {
        let key = if self.service_key.contains('%') {
            self.service_key.clone()
        } else {
            urlencoding::encode(&self.service_key).into_owned()
        };
        format!("{}?serviceKey={}", self.endpoint, key)
    }
}

#[async_trait]
impl VillageFeed for KmaClient {
    #[instrument(skip(self), fields(page = query.page_no), level = "debug")]
    async fn fetch_page(&self, query: &PageQuery) -> Result<FeedPage, ForecastError> {
        let res = self
            .http
            .get(self.keyed_url())
            .header(ACCEPT, "application/json")
            .query(&[
                ("pageNo", query.page_no.to_string()),
                ("numOfRows", ROWS_PER_PAGE.to_string()),
                ("dataType", "JSON".to_string()),
                ("base_date", query.base.date_param()),
                ("base_time", query.base.time_param()),
                ("nx", query.nx.to_string()),
                ("ny", query.ny.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ForecastError::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let page = decode_page(&body)?;
        debug!(rows = page.items.len(), total = ?page.total_count, "fetched forecast page");
        Ok(page)
    }
}

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    response: FeedResponse,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    header: FeedHeader,
    #[serde(default)]
    body: Option<FeedBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedHeader {
    result_code: String,
    #[serde(default)]
    result_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedBody {
    // An empty result sometimes arrives as `"items": ""`.
    #[serde(default)]
    items: Option<serde_json::Value>,
    #[serde(default)]
    total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct FeedItems {
    #[serde(default)]
    item: Option<OneOrMany<ForecastItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Decode a JSON feed response body.
pub fn decode_page(body: &str) -> Result<FeedPage, ForecastError> {
    let envelope: FeedEnvelope = serde_json::from_str(body)
        .map_err(|e| ForecastError::Malformed(format!("{e}: {}", truncate_body(body))))?;

    let header = envelope.response.header;
    if header.result_code != SUCCESS_CODE {
        return Err(ForecastError::Upstream {
            message: header
                .result_msg
                .unwrap_or_else(|| "Forecast service reported a failure".to_string()),
            code: header.result_code,
        });
    }

    let Some(body) = envelope.response.body else {
        return Ok(FeedPage::default());
    };

    let items = match body.items {
        Some(value @ serde_json::Value::Object(_)) => {
            let items: FeedItems = serde_json::from_value(value)
                .map_err(|e| ForecastError::Malformed(e.to_string()))?;
            items.item.map(Vec::from).unwrap_or_default()
        }
        _ => Vec::new(),
    };

    Ok(FeedPage {
        items,
        total_count: body.total_count,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
