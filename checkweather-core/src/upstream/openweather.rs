use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::UpstreamConfig,
    error::WeatherError,
    model::{Coordinates, decimal},
};

use super::{RawPayload, UpstreamClient};

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    geocode_url: String,
    onecall_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, config: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            geocode_url: config.geocode_url.clone(),
            onecall_url: config.onecall_url.clone(),
            http,
        })
    }

    /// GET `url` and return the body of a 2xx response.
    async fn get_body(&self, url: &str, query: &[(&str, &str)], what: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            // reqwest errors carry the full URL, appid included
            .map_err(|e| {
                anyhow!("Failed to send request to OpenWeather ({what}): {}", e.without_url())
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| {
                anyhow!("Failed to read OpenWeather {what} response body: {}", e.without_url())
            })?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoResult {
    lat: f64,
    lon: f64,
}

#[async_trait]
impl UpstreamClient for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Coordinates, WeatherError> {
        tracing::debug!(city, "geocoding");

        let body = self
            .get_body(&self.geocode_url, &[("q", city), ("limit", "1")], "geocoding")
            .await
            .map_err(WeatherError::Upstream)?;

        let results: Vec<OwGeoResult> = serde_json::from_str(&body).map_err(|e| {
            WeatherError::malformed(format!("geocoding response is not a list of places: {e}"))
        })?;

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound(city.to_string()))?;

        Ok(Coordinates::new(first.lat, first.lon))
    }

    async fn fetch_weather(&self, coords: Coordinates) -> Result<RawPayload, WeatherError> {
        tracing::debug!(lat = coords.lat, lon = coords.lon, "fetching one call weather");

        let lat = decimal(coords.lat);
        let lon = decimal(coords.lon);
        let body = self
            .get_body(
                &self.onecall_url,
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("units", "metric"),
                    ("exclude", "minutely,hourly"),
                ],
                "one call",
            )
            .await
            .map_err(WeatherError::Upstream)?;

        let value = serde_json::from_str(&body).map_err(|e| {
            WeatherError::malformed(format!("weather response is not valid JSON: {e}"))
        })?;

        Ok(RawPayload(value))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
