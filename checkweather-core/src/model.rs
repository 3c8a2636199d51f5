use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reject NaN/infinite values and anything outside the valid degree ranges.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(WeatherError::InvalidRequest(
                "latitude and longitude must be finite numbers".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(WeatherError::InvalidRequest(format!(
                "latitude {} is outside -90..=90",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(WeatherError::InvalidRequest(format!(
                "longitude {} is outside -180..=180",
                self.lon
            )));
        }
        Ok(())
    }
}

/// Decimal text for a coordinate: shortest round-trip digits, always with a
/// fractional part (`30.0`, not `30`).
pub fn decimal(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{text}.0")
    } else {
        text
    }
}

/// What the caller asked for: a city name, or coordinates that skip geocoding.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherRequest {
    City(String),
    Coordinates(Coordinates),
}

impl WeatherRequest {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        Self::Coordinates(Coordinates::new(lat, lon))
    }

    /// Build a request from the loose boundary inputs.
    ///
    /// Exactly one identifying form must be present: a non-blank city, or
    /// both `lat` and `lon`. Anything else is `InvalidRequest`.
    pub fn from_parts(
        city: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Self, WeatherError> {
        let city = city.filter(|c| !c.trim().is_empty());

        let request = match (city, lat, lon) {
            (Some(city), None, None) => Self::city(city),
            (None, Some(lat), Some(lon)) => Self::coordinates(lat, lon),
            (None, None, None) => {
                return Err(WeatherError::InvalidRequest(
                    "either a city or both latitude and longitude must be provided".to_string(),
                ));
            }
            (Some(_), _, _) => {
                return Err(WeatherError::InvalidRequest(
                    "provide a city or coordinates, not both".to_string(),
                ));
            }
            (None, _, _) => {
                return Err(WeatherError::InvalidRequest(
                    "latitude and longitude must be provided together".to_string(),
                ));
            }
        };

        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        match self {
            Self::City(name) if name.trim().is_empty() => Err(WeatherError::InvalidRequest(
                "city name must not be blank".to_string(),
            )),
            Self::City(_) => Ok(()),
            Self::Coordinates(coords) => coords.validate(),
        }
    }

    /// City name as given, if this is a city lookup.
    pub fn city_name(&self) -> Option<&str> {
        match self {
            Self::City(name) => Some(name),
            Self::Coordinates(_) => None,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_request(self)
    }
}

/// Cache key derived from a request.
///
/// City names are used verbatim (case-sensitive) and coordinates keep their
/// full float precision, so "cairo" and "Cairo" are separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    const PREFIX: &'static str = "weather";

    pub fn for_request(request: &WeatherRequest) -> Self {
        match request {
            WeatherRequest::City(name) => Self(format!("{}:{}", Self::PREFIX, name)),
            WeatherRequest::Coordinates(c) => Self(format!(
                "{}:{}:{}",
                Self::PREFIX,
                decimal(c.lat),
                decimal(c.lon)
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent.
    pub humidity: u8,
    /// Kilometers per hour.
    pub wind_speed: f64,
    pub condition: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub condition: String,
    pub icon: String,
}

/// Normalized weather for one location. This is also the cache wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    /// e.g. "Cairo, EG".
    pub location: String,
    pub current: CurrentWeather,
    /// Seven days starting tomorrow, oldest first.
    pub forecast: Vec<ForecastDay>,
    pub alert: Option<String>,
}
