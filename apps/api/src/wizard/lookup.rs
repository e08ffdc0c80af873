//! Debounced, cancelable regional-city lookup.
//!
//! Each country change schedules a lookup task keyed by the wizard's
//! generation counter. A short debounce absorbs rapid changes; scheduling a
//! new lookup aborts the superseded task outright. Outcomes carry their
//! generation so the wizard can discard anything stale that slipped through.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::LookupCache;
use crate::client::NexusClient;

/// Delay before a scheduled lookup fires.
pub const LOOKUP_DEBOUNCE: Duration = Duration::from_millis(100);

/// Source of regional-city lists.
#[async_trait]
pub trait CityProvider: Send + Sync {
    async fn regional_cities(&self, country: &str) -> Result<Vec<String>>;
}

/// The production provider: the cities cache reading through to the Nexus
/// API.
pub struct CachedCityProvider {
    client: NexusClient,
    cache: LookupCache<Vec<String>>,
}

impl CachedCityProvider {
    pub fn new(client: NexusClient, cache: LookupCache<Vec<String>>) -> Self {
        CachedCityProvider { client, cache }
    }
}

#[async_trait]
impl CityProvider for CachedCityProvider {
    async fn regional_cities(&self, country: &str) -> Result<Vec<String>> {
        let client = self.client.clone();
        let target = country.to_string();
        let cities = self
            .cache
            .get_or_fetch(country, || async move {
                client.fetch_regional_cities(&target).await
            })
            .await?;
        Ok(cities)
    }
}

/// One finished lookup, tagged with the generation that requested it.
#[derive(Debug)]
pub struct LookupOutcome {
    pub generation: u64,
    pub result: Result<Vec<String>, String>,
}

/// Schedules debounced lookup tasks, aborting the in-flight one whenever a
/// newer request supersedes it.
pub struct CityLookupService {
    provider: Arc<dyn CityProvider>,
    outcomes: mpsc::UnboundedSender<LookupOutcome>,
    in_flight: Option<JoinHandle<()>>,
}

impl CityLookupService {
    pub fn new(provider: Arc<dyn CityProvider>, outcomes: mpsc::UnboundedSender<LookupOutcome>) -> Self {
        CityLookupService {
            provider,
            outcomes,
            in_flight: None,
        }
    }

    /// Schedules a lookup for `country` under `generation`, replacing any
    /// pending one.
    pub fn schedule(&mut self, generation: u64, country: String) {
        self.cancel();

        let provider = Arc::clone(&self.provider);
        let outcomes = self.outcomes.clone();
        self.in_flight = Some(tokio::spawn(async move {
            tokio::time::sleep(LOOKUP_DEBOUNCE).await;
            debug!("Looking up regional cities for '{country}' (generation {generation})");
            let result = provider
                .regional_cities(&country)
                .await
                .map_err(|e| e.to_string());
            // The receiver may be gone if the wizard was torn down.
            let _ = outcomes.send(LookupOutcome { generation, result });
        }));
    }

    /// Aborts the pending lookup, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

impl Drop for CityLookupService {
    fn drop(&mut self) {
        self.cancel();
    }
}
