use std::sync::Arc;

use crate::pipeline::{HybridRetriever, PipelineServices, Readiness, RetrievalConfig};

/// Source of the `/ready` report.
pub trait ReadinessProbe: Send + Sync {
    fn readiness(&self) -> Readiness;
}

impl ReadinessProbe for PipelineServices {
    fn readiness(&self) -> Readiness {
        PipelineServices::readiness(self)
    }
}

/// A fixed snapshot, for deployments (and tests) without lazily built services.
impl ReadinessProbe for Readiness {
    fn readiness(&self) -> Readiness {
        *self
    }
}

#[derive(Clone)]
pub struct HandlerState {
    pub retriever: Arc<HybridRetriever>,

    pub probe: Arc<dyn ReadinessProbe>,
}

impl HandlerState {
    pub fn new(services: &PipelineServices, config: RetrievalConfig) -> Self {
        Self {
            retriever: Arc::new(services.retriever(config)),
            probe: Arc::new(services.clone()),
        }
    }

    pub fn with_probe(retriever: HybridRetriever, probe: Arc<dyn ReadinessProbe>) -> Self {
        Self {
            retriever: Arc::new(retriever),
            probe,
        }
    }
}
