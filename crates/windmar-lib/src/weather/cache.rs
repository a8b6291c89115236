use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::geo::GeoPosition;

use super::{WeatherSample, WeatherSource};

/// Per-request memo of weather lookups.
///
/// Owned by a single search call and dropped with it. Keys are the exact position and
/// the sample time truncated to whole seconds, so cached and uncached lookups agree.
#[derive(Debug)]
pub struct WeatherCache<'a> {
    source: &'a WeatherSource,
    entries: HashMap<(u64, u64, i64), Option<WeatherSample>>,
    hits: usize,
}

impl<'a> WeatherCache<'a> {
    pub fn new(source: &'a WeatherSource) -> Self {
        Self {
            source,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    pub fn sample(&mut self, position: &GeoPosition, time: DateTime<Utc>) -> Option<WeatherSample> {
        let key = (position.lat.to_bits(), position.lon.to_bits(), time.timestamp());
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return *cached;
        }
        let at = DateTime::<Utc>::from_timestamp(key.2, 0).unwrap_or(time);
        let sample = self.source.sample(position, at);
        self.entries.insert(key, sample);
        sample
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of distinct lookups forwarded to the source.
    pub fn misses(&self) -> usize {
        self.entries.len()
    }
}
