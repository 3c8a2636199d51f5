use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    model::Coordinates,
    upstream::openweather::OpenWeatherClient,
};

pub mod openweather;

/// Raw provider JSON from the current+forecast endpoint. Only the normalizer
/// interprets its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload(pub serde_json::Value);

impl RawPayload {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

#[async_trait]
pub trait UpstreamClient: Send + Sync + Debug {
    /// Resolve a city name to coordinates.
    ///
    /// Fails with `NotFound` when the provider knows no such place and with
    /// `Upstream` on transport errors or non-2xx responses.
    async fn geocode(&self, city: &str) -> Result<Coordinates, WeatherError>;

    /// Fetch current conditions plus the daily forecast for `coords`.
    async fn fetch_weather(&self, coords: Coordinates) -> Result<RawPayload, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key()?;
    OpenWeatherClient::new(api_key.to_owned(), &config.upstream)
}
