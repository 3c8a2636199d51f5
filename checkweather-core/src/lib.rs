//! Core library for the `checkweather` lookup proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The request, cache-key and normalized weather models
//! - A cache abstraction with Redis and in-process backends
//! - The OpenWeather upstream client and payload normalizer
//! - `WeatherResolver`, which ties them together cache-first
//!
//! It is used by `checkweather-cli`, but can also sit behind an HTTP service.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod resolver;
pub mod upstream;

pub use cache::{CacheStore, MemoryCache, RedisCache};
pub use config::{CacheConfig, Config, UpstreamConfig};
pub use error::{ErrorKind, WeatherError};
pub use model::{CacheKey, Coordinates, CurrentWeather, ForecastDay, WeatherData, WeatherRequest};
pub use normalize::normalize;
pub use resolver::WeatherResolver;
pub use upstream::{RawPayload, UpstreamClient, openweather::OpenWeatherClient};
