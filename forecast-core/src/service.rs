//! Entry point: weather summary for a location and forecast day.

use chrono::{DateTime, NaiveTime, Utc};
use futures::future::try_join_all;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument};

use crate::{
    base_time::{self, ForecastDay},
    cache::SummaryCache,
    category::{Category, TMN_HOUR, TMX_HOUR},
    config::Config,
    error::ForecastError,
    feed::{KmaClient, VillageFeed},
    kst::{Clock, SystemClock},
    location::{Location, LocationDirectory},
    session::ForecastSession,
    summary::{WeatherSummary, build_summary},
};

/// Categories read at the target hour.
pub const HOURLY_CATEGORIES: [Category; 6] = [
    Category::Tmp,
    Category::Pop,
    Category::Pty,
    Category::Sky,
    Category::Reh,
    Category::Wsd,
];

/// Daily categories and the hour of the day they are published under.
pub const DAILY_CATEGORIES: [(Category, u32); 2] =
    [(Category::Tmn, TMN_HOUR), (Category::Tmx, TMX_HOUR)];

#[derive(Debug)]
pub struct ForecastService {
    feed: Arc<dyn VillageFeed>,
    locations: LocationDirectory,
    cache: SummaryCache,
    clock: Arc<dyn Clock>,
}

impl ForecastService {
    pub fn new(feed: Arc<dyn VillageFeed>, locations: LocationDirectory) -> Self {
        Self {
            feed,
            locations,
            cache: SummaryCache::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Construct a service talking to the configured forecast endpoint.
    pub fn from_config(config: &Config) -> Result<Self, ForecastError> {
        let key = config.resolved_service_key()?;
        let client = KmaClient::with_endpoint(key, config.endpoint().to_string())?;

        Ok(Self::new(Arc::new(client), config.location_directory())
            .with_cache(SummaryCache::new(config.cache_ttl())))
    }

    pub fn with_cache(mut self, cache: SummaryCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn locations(&self) -> &LocationDirectory {
        &self.locations
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    /// Weather summary for `location_id` on `day`.
    ///
    /// Served from the summary cache while a fresh entry exists. Values the
    /// feed does not provide are left empty on the summary rather than
    /// failing the call.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather(
        &self,
        location_id: &str,
        day: ForecastDay,
    ) -> Result<Arc<WeatherSummary>, ForecastError> {
        let location = self.locations.resolve(location_id)?;
        let key = location_id.trim().to_lowercase();

        if let Some(hit) = self.cache.get(&key, day, self.clock.now()) {
            return Ok(hit);
        }

        let summary = Arc::new(self.resolve(location, day, self.clock.now()).await?);
        self.cache
            .insert(&key, day, Arc::clone(&summary), self.clock.now());
        Ok(summary)
    }

    async fn resolve(
        &self,
        location: &Location,
        day: ForecastDay,
        now: DateTime<Utc>,
    ) -> Result<WeatherSummary, ForecastError> {
        let base = base_time::query_base(now);
        let target = base_time::resolve_target(now, day);
        debug!(
            base_date = %base.date_param(),
            base_time = %base.time_param(),
            target_date = %target.date,
            target_hour = target.hour,
            "resolving forecast"
        );

        let session = ForecastSession::new(self.feed.as_ref(), base, location.nx, location.ny);
        let anchor = session.anchor().await?;

        // The feed says nothing about hours before its first row.
        let hour = if target.date == anchor.first_date && target.hour < anchor.first_hour {
            anchor.first_hour
        } else {
            target.hour
        };

        let session = &session;
        let lookups = HOURLY_CATEGORIES
            .iter()
            .map(|&category| (category, hour))
            .chain(DAILY_CATEGORIES)
            .map(|(category, at)| async move {
                let value = session.get_value(category, target.date, at).await?;
                Ok::<_, ForecastError>((category, value))
            });

        let values: HashMap<Category, String> = try_join_all(lookups)
            .await?
            .into_iter()
            .filter_map(|(category, value)| value.map(|v| (category, v)))
            .collect();
        debug!(
            resolved = values.len(),
            pages = session.pages_fetched(),
            "forecast values resolved"
        );

        let time = NaiveTime::from_hms_opt(hour, 0, 0)
            .ok_or_else(|| ForecastError::Malformed(format!("invalid forecast hour {hour}")))?;

        Ok(build_summary(
            &values,
            target.date.and_time(time),
            &location.label,
        ))
    }
}
