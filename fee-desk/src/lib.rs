pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use crate::services::{CollectionRules, FeeCache, FeeLedger};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub fees: Arc<FeeCache>,
    pub rules: CollectionRules,
}

impl AppState {
    pub fn new(ledger: Arc<dyn FeeLedger>, rules: CollectionRules, cache_ttl: Duration) -> Self {
        Self {
            fees: Arc::new(FeeCache::new(ledger, cache_ttl)),
            rules,
        }
    }

    pub fn ledger(&self) -> &Arc<dyn FeeLedger> {
        self.fees.ledger()
    }
}
