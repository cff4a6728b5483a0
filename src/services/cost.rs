//! Cost accounting
//!
//! Tracks USD spent and the metadata of the last wire call. Spend lives in
//! exactly one place: the client's own configuration, or an external
//! container shared between clients.

use crate::config::MagicConfig;
use crate::models::Meta;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// Shared spend counter
///
/// Cloning yields another handle to the same counter, so several clients
/// built with clones of one container draw from a single budget.
#[derive(Debug, Clone, Default)]
pub struct CostContainer {
    usd_spent: Arc<Mutex<f64>>,
}

impl CostContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spent(usd_spent: f64) -> Self {
        Self {
            usd_spent: Arc::new(Mutex::new(usd_spent)),
        }
    }

    pub fn usd_spent(&self) -> f64 {
        *self.usd_spent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_usd_spent(&self, value: f64) {
        *self.usd_spent.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Atomically add `cost`, returning the new total
    pub fn add(&self, cost: f64) -> f64 {
        let mut spent = self.usd_spent.lock().unwrap_or_else(PoisonError::into_inner);
        *spent += cost;
        *spent
    }

    /// Whether both handles point at the same counter
    pub fn shares_with(&self, other: &CostContainer) -> bool {
        Arc::ptr_eq(&self.usd_spent, &other.usd_spent)
    }
}

/// Owner of the spend counter, fixed when the client is built
#[derive(Debug, Clone)]
pub enum CostOwner {
    /// Spend belongs to the client's configuration
    Config(CostContainer),
    /// Spend belongs to an injected container
    External(CostContainer),
}

impl CostOwner {
    /// Pick the owner: an external container wins over `usd_spent`
    pub fn resolve(config: &MagicConfig) -> Self {
        match &config.external_cost_container {
            Some(container) => CostOwner::External(container.clone()),
            None => CostOwner::Config(CostContainer::with_spent(config.usd_spent.unwrap_or(0.0))),
        }
    }

    pub fn container(&self) -> &CostContainer {
        match self {
            CostOwner::Config(container) | CostOwner::External(container) => container,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, CostOwner::External(_))
    }
}

/// Spend and last-call metadata of one client
#[derive(Debug)]
pub struct CostTracker {
    owner: CostOwner,
    last_meta: RwLock<Option<Meta>>,
}

impl CostTracker {
    pub fn new(config: &MagicConfig) -> Self {
        Self {
            owner: CostOwner::resolve(config),
            last_meta: RwLock::new(None),
        }
    }

    /// Account for one completed wire call
    pub fn record(&self, meta: Meta) {
        let total = self.accumulate(meta.approximate_cost);
        if let Ok(mut last) = self.last_meta.write() {
            *last = Some(meta);
        }
        debug!(
            "Recorded call cost: ${:.6} ({} tokens), total ${:.6}",
            meta.approximate_cost, meta.token_count, total
        );
    }

    /// Add to whichever object owns the spend
    pub fn accumulate(&self, approximate_cost: f64) -> f64 {
        self.owner.container().add(approximate_cost)
    }

    pub fn usd_spent(&self) -> f64 {
        self.owner.container().usd_spent()
    }

    pub fn set_usd_spent(&self, value: f64) {
        self.owner.container().set_usd_spent(value);
    }

    pub fn last_meta(&self) -> Option<Meta> {
        self.last_meta.read().ok().and_then(|meta| *meta)
    }

    pub fn owner(&self) -> &CostOwner {
        &self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(cost: f64, tokens: u64) -> Meta {
        Meta {
            approximate_cost: cost,
            token_count: tokens,
        }
    }

    #[test]
    fn test_config_owned_spend() {
        let tracker = CostTracker::new(&MagicConfig::new().with_usd_spent(1.0));
        assert!(!tracker.owner().is_external());

        tracker.record(meta(0.5, 10));
        tracker.record(meta(0.25, 20));

        assert_eq!(tracker.usd_spent(), 1.75);
        assert_eq!(tracker.last_meta(), Some(meta(0.25, 20)));
    }

    #[test]
    fn test_external_container_owns_spend() {
        let shared = CostContainer::with_spent(2.0);
        let config = MagicConfig::new()
            .with_usd_spent(100.0)
            .with_external_cost_container(shared.clone());
        let tracker = CostTracker::new(&config);
        assert!(tracker.owner().is_external());

        tracker.record(meta(0.5, 1));
        assert_eq!(shared.usd_spent(), 2.5);
        assert_eq!(tracker.usd_spent(), 2.5);
    }

    #[test]
    fn test_two_trackers_share_one_budget() {
        let shared = CostContainer::new();
        let config = MagicConfig::new().with_external_cost_container(shared.clone());
        let first = CostTracker::new(&config);
        let second = CostTracker::new(&config);

        first.record(meta(0.1, 1));
        second.record(meta(0.2, 1));

        assert!((shared.usd_spent() - 0.3).abs() < 1e-9);
        assert!(first.owner().container().shares_with(second.owner().container()));
        assert_eq!(first.last_meta(), Some(meta(0.1, 1)));
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let shared = CostContainer::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        container.add(1.0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.usd_spent(), 8000.0);
    }

    #[test]
    fn test_set_usd_spent_routes_to_owner() {
        let shared = CostContainer::new();
        let tracker = CostTracker::new(&MagicConfig::new().with_external_cost_container(shared.clone()));
        tracker.set_usd_spent(4.0);
        assert_eq!(shared.usd_spent(), 4.0);
    }
}
