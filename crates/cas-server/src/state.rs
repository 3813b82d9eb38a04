//! Shared application state.

use crate::config::Config;
use cas_core::{AlgebraEngine, Cas, ConnectionRegistry, EngineDispatcher};
use std::sync::Arc;

pub struct AppState {
    pub engine: EngineDispatcher,
    pub connections: ConnectionRegistry,
    pub config: Config,
}

impl AppState {
    /// State backed by the bundled engine.
    pub fn new(config: Config) -> Self {
        Self::with_engine(config, Arc::new(Cas))
    }

    pub fn with_engine(config: Config, engine: Arc<dyn AlgebraEngine>) -> Self {
        let engine = EngineDispatcher::new(engine, config.dispatcher_config());
        Self {
            engine,
            connections: ConnectionRegistry::new(),
            config,
        }
    }
}
