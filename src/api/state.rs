use std::sync::Arc;

use crate::cache::EdgeCache;
use crate::clock::Clock;
use crate::config::RoutingConfig;
use crate::executor::StepExecutor;
use crate::prefetch::PrefetchOrchestrator;
use crate::router::Router as EdgeRouter;
use crate::store::KeyValueStore;

/// Shared application state handed to every handler. Mutable domain state
/// (provisional/reserved quotes, deposits, executions) lives behind the
/// `KeyValueStore`, not in this struct - there's no `AppStateInner` lock to
/// contend on the hot path, just a bundle of already-synchronized Arcs.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub cache: Arc<EdgeCache>,
    pub router: Arc<EdgeRouter>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<RoutingConfig>,
    pub executor: Arc<dyn StepExecutor>,
    pub prefetch: Arc<PrefetchOrchestrator>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cache: Arc<EdgeCache>,
        router: Arc<EdgeRouter>,
        clock: Arc<dyn Clock>,
        config: Arc<RoutingConfig>,
        executor: Arc<dyn StepExecutor>,
        prefetch: Arc<PrefetchOrchestrator>,
    ) -> Self {
        AppState { store, cache, router, clock, config, executor, prefetch }
    }
}
