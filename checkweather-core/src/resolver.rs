use std::{sync::Arc, time::Duration};

use crate::{
    cache::CacheStore,
    error::WeatherError,
    model::{WeatherData, WeatherRequest},
    normalize::normalize,
    upstream::UpstreamClient,
};

/// Cache-first weather lookup: key, cache, geocode, fetch, normalize, store.
///
/// Both collaborators are injected. Concurrent misses for the same key are
/// not coalesced; each one calls upstream and the last write wins.
#[derive(Debug, Clone)]
pub struct WeatherResolver {
    cache: Arc<dyn CacheStore>,
    upstream: Arc<dyn UpstreamClient>,
    ttl: Duration,
}

impl WeatherResolver {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        upstream: Arc<dyn UpstreamClient>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            upstream,
            ttl,
        }
    }

    /// Boundary entry point taking the loose `city` / `lat` / `lon` inputs.
    pub async fn get_weather(
        &self,
        city: Option<&str>,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<WeatherData, WeatherError> {
        let request = WeatherRequest::from_parts(city, lat, lon)?;
        self.resolve(&request).await
    }

    #[tracing::instrument(level = "debug", skip(self), fields(key = tracing::field::Empty))]
    pub async fn resolve(&self, request: &WeatherRequest) -> Result<WeatherData, WeatherError> {
        request.validate()?;

        let key = request.cache_key();
        tracing::Span::current().record("key", key.as_str());

        if let Some(hit) = self.cache.get(key.as_str()).await {
            tracing::debug!("cache hit");
            return Ok(hit);
        }
        tracing::debug!("cache miss");

        let coords = match request {
            WeatherRequest::City(city) => self.upstream.geocode(city).await?,
            WeatherRequest::Coordinates(coords) => *coords,
        };

        let raw = self.upstream.fetch_weather(coords).await?;
        let data = normalize(&raw, request.city_name())?;

        if self.ttl.is_zero() {
            tracing::debug!("caching disabled, skipping store");
        } else {
            self.cache.put(key.as_str(), &data, self.ttl).await;
        }

        Ok(data)
    }
}
