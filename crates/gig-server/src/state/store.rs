//! Application state shared by request handlers.

use dashmap::DashMap;
use gig_core::{ConflictResolver, SchedulingRules};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::Config;
use crate::persistence::Database;

/// Application state - database handle, resolver and per-provider intake locks.
pub struct AppState {
    db: Database,
    config: Config,
    resolver: ConflictResolver,
    /// One lock per provider; held across snapshot load, evaluation and insert.
    provider_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let resolver = ConflictResolver::new(&config.rules);
        Self {
            db,
            config,
            resolver,
            provider_locks: DashMap::new(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rules(&self) -> &SchedulingRules {
        &self.config.rules
    }

    pub fn resolver(&self) -> &ConflictResolver {
        &self.resolver
    }

    /// Wait for exclusive intake access to a provider's schedule.
    ///
    /// The map entry is removed when the last guard or waiter for the
    /// provider lets go, so the map only holds providers with work in flight.
    pub async fn lock_provider(&self, provider_id: &str) -> ProviderGuard<'_> {
        let lock = self
            .provider_locks
            .entry(provider_id.to_string())
            .or_default()
            .clone();
        ProviderGuard {
            locks: &self.provider_locks,
            provider_id: provider_id.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_providers(&self) -> usize {
        self.provider_locks.len()
    }
}

/// Held for the duration of one provider's check-and-persist.
pub struct ProviderGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    provider_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ProviderGuard<'_> {
    fn drop(&mut self) {
        // Release our clone first; a count of one is then the map's own.
        self.guard.take();
        self.locks
            .remove_if(&self.provider_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
