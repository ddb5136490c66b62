//! Fan-out over every feed, merge, and cache the result

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{info, instrument, warn};
use wxfuse_cache::DiskCache;
use wxfuse_config::AppConfig;
use wxfuse_core::{merge, AggregateRecord, Location, MergeInputs};
use wxfuse_ingest::{
    with_deadline, AuroraSource, HttpFetcher, KpSource, PlaceResolver, Query, SmhiSource,
    WeatherApiSource, WeatherSource,
};

/// A record plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated {
    pub record: AggregateRecord,
    pub cached: bool,
}

pub struct Aggregator {
    primary: Box<dyn WeatherSource>,
    secondary: Box<dyn WeatherSource>,
    kp: KpSource,
    aurora: AuroraSource,
    places: PlaceResolver,
    cache: Option<DiskCache>,
    deadline: Duration,
}

impl Aggregator {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let http = HttpFetcher::new(cfg.request_timeout(), &cfg.user_agent())
            .context("failed to build HTTP client")?;

        let cache = cfg
            .cache_enabled()
            .then(|| DiskCache::new(cfg.cache_dir(), cfg.cache_ttl()));

        Ok(Self {
            primary: Box::new(SmhiSource::new(http.clone(), cfg.smhi_url())),
            secondary: Box::new(WeatherApiSource::new(
                http.clone(),
                cfg.weatherapi_url(),
                cfg.api_key(),
            )),
            kp: KpSource::new(http.clone(), cfg.kp_url()),
            aurora: AuroraSource::new(http.clone(), cfg.aurora_url()),
            places: PlaceResolver::new(http, cfg.nominatim_url()),
            cache,
            deadline: cfg.request_timeout(),
        })
    }

    pub fn cache(&self) -> Option<&DiskCache> {
        self.cache.as_ref()
    }

    pub async fn aggregate(&self, latitude: f64, longitude: f64) -> Aggregated {
        self.aggregate_at(latitude, longitude, Utc::now()).await
    }

    /// Build the record for a point as of `now`. Never fails: sources that
    /// cannot be used leave their fields unknown.
    #[instrument(skip(self))]
    pub async fn aggregate_at(
        &self,
        latitude: f64,
        longitude: f64,
        now: DateTime<Utc>,
    ) -> Aggregated {
        if let Some(record) = self.cache.as_ref().and_then(|c| c.get(latitude, longitude)) {
            info!("serving cached record");
            return Aggregated {
                record,
                cached: true,
            };
        }

        let record = self.collect(&Query::new(latitude, longitude, now)).await;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(latitude, longitude, &record) {
                warn!(error = %e, "failed to write cache entry");
            }
        }

        Aggregated {
            record,
            cached: false,
        }
    }

    async fn collect(&self, query: &Query) -> AggregateRecord {
        let (primary, secondary, kp, aurora, place) = tokio::join!(
            with_deadline(self.deadline, self.primary.fetch(query)),
            with_deadline(self.deadline, self.secondary.fetch(query)),
            with_deadline(self.deadline, self.kp.fetch(query)),
            with_deadline(self.deadline, self.aurora.fetch(query)),
            with_deadline(self.deadline, self.places.resolve(query)),
        );

        let mut location = Location::new(query.latitude, query.longitude);
        location.place = place.into_logged("nominatim");
        location.generated_at = Some(query.now.timestamp());

        merge(&MergeInputs {
            location,
            primary: primary.into_logged(self.primary.name()).unwrap_or_default(),
            secondary: secondary
                .into_logged(self.secondary.name())
                .unwrap_or_default(),
            kp_index: kp.into_logged("kp"),
            aurora_probability: aurora.into_logged("aurora"),
        })
    }
}
