//! Converts the provider's One Call payload into [`WeatherData`].
//!
//! The payload is first parsed into typed structs so that every missing or
//! mistyped field surfaces as `MalformedUpstreamData` before any transform
//! runs.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::WeatherError,
    model::{CurrentWeather, ForecastDay, WeatherData, decimal},
    upstream::RawPayload,
};

/// Number of forecast days returned, starting tomorrow.
pub const FORECAST_DAYS: usize = 7;

const MS_TO_KMH: f64 = 3.6;

#[derive(Debug, Deserialize)]
struct OwPayload {
    lat: Option<f64>,
    lon: Option<f64>,
    current: OwCurrent,
    // Entries are parsed one by one; index 0 (today) is never read.
    daily: Vec<Value>,
    #[serde(default)]
    alerts: Option<Vec<OwAlert>>,
    #[serde(default)]
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    temp: f64,
    humidity: u8,
    wind_speed: f64,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwDaily {
    dt: i64,
    temp: OwDailyTemp,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct OwAlert {
    event: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

/// Normalize a raw payload. `city_name` is the city the caller asked for,
/// `None` for coordinate lookups.
pub fn normalize(raw: &RawPayload, city_name: Option<&str>) -> Result<WeatherData, WeatherError> {
    let payload = OwPayload::deserialize(&raw.0)
        .map_err(|e| WeatherError::malformed(format!("weather payload: {e}")))?;

    if payload.daily.len() < FORECAST_DAYS + 1 {
        return Err(WeatherError::malformed(format!(
            "expected at least {} daily entries, got {}",
            FORECAST_DAYS + 1,
            payload.daily.len()
        )));
    }

    let location = location(&payload, city_name)?;

    let condition = first_condition(&payload.current.weather, "current")?;
    let current = CurrentWeather {
        temperature: payload.current.temp,
        humidity: payload.current.humidity,
        wind_speed: payload.current.wind_speed * MS_TO_KMH,
        condition: capitalize_first(&condition.description),
        icon: condition.icon.clone(),
    };

    let forecast = payload.daily[1..=FORECAST_DAYS]
        .iter()
        .enumerate()
        .map(|(i, entry)| forecast_day(entry, i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let alert = payload
        .alerts
        .as_deref()
        .and_then(|alerts| alerts.first())
        .and_then(|a| a.event.clone());

    Ok(WeatherData {
        location,
        current,
        forecast,
        alert,
    })
}

fn location(payload: &OwPayload, city_name: Option<&str>) -> Result<String, WeatherError> {
    let country = payload
        .sys
        .as_ref()
        .and_then(|s| s.country.as_deref())
        .filter(|c| !c.is_empty());

    match (city_name, country) {
        (Some(city), Some(country)) => Ok(format!("{}, {}", capitalize_first(city), country)),
        (Some(city), None) => Ok(city.to_string()),
        (None, _) => match (payload.lat, payload.lon) {
            (Some(lat), Some(lon)) => Ok(format!("{}, {}", decimal(lat), decimal(lon))),
            _ => Err(WeatherError::malformed("coordinate lookup payload has no lat/lon")),
        },
    }
}

fn forecast_day(entry: &Value, index: usize) -> Result<ForecastDay, WeatherError> {
    let day = OwDaily::deserialize(entry)
        .map_err(|e| WeatherError::malformed(format!("daily[{index}]: {e}")))?;

    let date = DateTime::from_timestamp(day.dt, 0)
        .ok_or_else(|| {
            WeatherError::malformed(format!("daily[{index}].dt out of range: {}", day.dt))
        })?
        .format("%Y-%m-%d")
        .to_string();

    let condition = first_condition(&day.weather, "daily")?;

    Ok(ForecastDay {
        date,
        temp_max: day.temp.max,
        temp_min: day.temp.min,
        condition: capitalize_first(&condition.description),
        icon: condition.icon.clone(),
    })
}

fn first_condition<'a>(
    weather: &'a [OwCondition],
    what: &str,
) -> Result<&'a OwCondition, WeatherError> {
    weather
        .first()
        .ok_or_else(|| WeatherError::malformed(format!("{what} entry has an empty weather list")))
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
