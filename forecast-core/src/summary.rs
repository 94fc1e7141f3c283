//! Typed weather summary assembled from resolved feed values.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{category::Category, kst, session::parse_value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub summary: String,
    pub temperature: Option<f64>,
    pub lowest_temperature: Option<f64>,
    pub highest_temperature: Option<f64>,
    /// Percent, rounded to a whole number.
    pub precipitation_probability: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation_type: Option<String>,
    pub sky_status: Option<String>,
    pub date_time_label: String,
    /// Instant of the forecast hour described.
    pub observed_at: DateTime<Utc>,
    pub station_name: String,
}

/// `PTY` codes. Code 0 (no precipitation) has no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationType {
    Rain,
    RainAndSnow,
    Snow,
    Shower,
    Raindrops,
    RaindropsAndSnowFlurries,
    SnowFlurries,
}

impl PrecipitationType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::Rain),
            "2" => Some(Self::RainAndSnow),
            "3" => Some(Self::Snow),
            "4" => Some(Self::Shower),
            "5" => Some(Self::Raindrops),
            "6" => Some(Self::RaindropsAndSnowFlurries),
            "7" => Some(Self::SnowFlurries),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rain => "비",
            Self::RainAndSnow => "비/눈",
            Self::Snow => "눈",
            Self::Shower => "소나기",
            Self::Raindrops => "빗방울",
            Self::RaindropsAndSnowFlurries => "빗방울/눈날림",
            Self::SnowFlurries => "눈날림",
        }
    }
}

/// `SKY` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyStatus {
    Clear,
    MostlyCloudy,
    Overcast,
}

impl SkyStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::Clear),
            "3" => Some(Self::MostlyCloudy),
            "4" => Some(Self::Overcast),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "맑음",
            Self::MostlyCloudy => "구름 많음",
            Self::Overcast => "흐림",
        }
    }
}

/// Round to the nearest integer, halves towards positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// `MM.DD H시 예보`
pub fn forecast_label(forecast_at: NaiveDateTime) -> String {
    format!(
        "{:02}.{:02} {}시 예보",
        forecast_at.month(),
        forecast_at.day(),
        forecast_at.hour()
    )
}

/// Assemble a summary from raw feed values keyed by category.
///
/// `forecast_at` is the KST wall-clock hour the values describe.
pub fn build_summary(
    values: &HashMap<Category, String>,
    forecast_at: NaiveDateTime,
    station_name: &str,
) -> WeatherSummary {
    let raw = |category: Category| values.get(&category).map(String::as_str);
    let number = |category: Category| parse_value(raw(category));

    let temperature = number(Category::Tmp);
    let precipitation_probability = number(Category::Pop);
    let humidity = number(Category::Reh);
    let wind_speed = number(Category::Wsd);
    let lowest_temperature = number(Category::Tmn);
    let highest_temperature = number(Category::Tmx);
    let precipitation_type = raw(Category::Pty).and_then(PrecipitationType::from_code);
    let sky_status = raw(Category::Sky).and_then(SkyStatus::from_code);

    let mut segments = Vec::new();
    if let Some(t) = temperature {
        segments.push(format!("기온 {}°C", round_half_up(t)));
    }
    if let Some(t) = lowest_temperature {
        segments.push(format!("최저 {}°C", round_half_up(t)));
    }
    if let Some(t) = highest_temperature {
        segments.push(format!("최고 {}°C", round_half_up(t)));
    }
    if let Some(p) = precipitation_probability {
        segments.push(format!("강수확률 {}%", round_half_up(p)));
    }
    if let Some(kind) = precipitation_type {
        segments.push(format!("강수 형태 {}", kind.label()));
    }
    if let Some(sky) = sky_status {
        segments.push(format!("하늘 {}", sky.label()));
    }
    if let Some(h) = humidity {
        segments.push(format!("습도 {}%", round_half_up(h)));
    }
    if let Some(w) = wind_speed {
        segments.push(format!("풍속 {w:.1}m/s"));
    }

    let summary = if segments.is_empty() {
        format!("{station_name}의 날씨 정보를 불러오지 못했어요.")
    } else {
        segments.join(", ")
    };

    WeatherSummary {
        summary,
        temperature,
        lowest_temperature,
        highest_temperature,
        precipitation_probability: precipitation_probability.map(round_half_up),
        humidity,
        wind_speed,
        precipitation_type: precipitation_type.map(|kind| kind.label().to_string()),
        sky_status: sky_status.map(|sky| sky.label().to_string()),
        date_time_label: forecast_label(forecast_at),
        observed_at: kst::from_kst(forecast_at),
        station_name: station_name.to_string(),
    }
}
