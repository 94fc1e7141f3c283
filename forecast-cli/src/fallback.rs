use chrono::{DateTime, Utc};
use forecast_core::{ForecastDay, WeatherSummary};

const UNKNOWN_STATION: &str = "선택 지역";

/// Placeholder describing a mild spring day, shown when the real forecast
/// could not be obtained.
pub fn fallback_summary(
    station: Option<&str>,
    day: ForecastDay,
    now: DateTime<Utc>,
) -> WeatherSummary {
    let station = station.unwrap_or(UNKNOWN_STATION);
    let day_label = day.label();

    WeatherSummary {
        summary: format!(
            "{station}의 {day_label} 날씨 정보를 가져오지 못해 평균적인 봄날을 가정했어요."
        ),
        temperature: Some(20.0),
        lowest_temperature: Some(15.0),
        highest_temperature: Some(23.0),
        precipitation_probability: Some(10.0),
        humidity: Some(50.0),
        wind_speed: Some(2.0),
        precipitation_type: None,
        sky_status: Some("맑음".to_string()),
        date_time_label: format!("{day_label} 예시"),
        observed_at: now,
        station_name: station.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_names_station_and_day() {
        let now = Utc::now();
        let summary = fallback_summary(Some("서울"), ForecastDay::Tomorrow, now);

        assert!(summary.summary.starts_with("서울의 내일"));
        assert_eq!(summary.date_time_label, "내일 예시");
        assert_eq!(summary.temperature, Some(20.0));
        assert_eq!(summary.observed_at, now);
    }

    #[test]
    fn fallback_without_station() {
        let summary = fallback_summary(None, ForecastDay::Today, Utc::now());
        assert_eq!(summary.station_name, UNKNOWN_STATION);
        assert!(summary.summary.contains("오늘"));
    }
}
