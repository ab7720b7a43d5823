//! Common test helpers
use std::sync::Arc;

use linsheet_common::CellId;

use crate::diagnostics::CollectingSink;
use crate::engine::{Engine, EvalConfig, EvalMetrics, EvalResult};

pub fn id(name: &str) -> CellId {
    name.parse().unwrap()
}

pub fn pool_config(threads: usize) -> EvalConfig {
    EvalConfig::default().with_max_threads(threads)
}

pub fn inline_config() -> EvalConfig {
    EvalConfig::default().with_parallel(false)
}

pub struct Harness {
    pub engine: Engine,
    pub sink: Arc<CollectingSink>,
    pub metrics: Arc<EvalMetrics>,
}

impl Harness {
    pub fn new(config: EvalConfig) -> Self {
        let sink = Arc::new(CollectingSink::new());
        let metrics = Arc::new(EvalMetrics::new());
        let engine = Engine::with_observers(config, sink.clone(), metrics.clone());
        Self {
            engine,
            sink,
            metrics,
        }
    }

    /// Load definitions written in the input grammar.
    pub fn load_source(&mut self, source: &str) {
        let parsed = linsheet_parse::parse_source(source);
        assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
        self.engine.load(&parsed.definitions).unwrap();
    }

    pub fn run(&mut self) -> EvalResult {
        self.engine.evaluate_all().unwrap()
    }

    pub fn value(&self, name: &str) -> Option<i64> {
        self.engine.value_of(id(name))
    }

    /// `name = value` lines for every resolved cell, as the CLI prints them.
    pub fn rendered(&self) -> Vec<String> {
        self.engine
            .resolved_values()
            .into_iter()
            .map(|(cell, value)| format!("{cell} = {value}"))
            .collect()
    }
}

/// Evaluate `source` under `config` and return the harness for inspection.
pub fn evaluate(source: &str, config: EvalConfig) -> Harness {
    let mut harness = Harness::new(config);
    harness.load_source(source);
    harness.run();
    harness
}
