//! Shared handle over the pipeline and the state store
//!
//! A [`Monitor`] is cloned into the ingestion worker (writer) and into the
//! request surface (readers, reset). The pipeline sits behind a mutex, and
//! the ingest-then-publish sequence runs while that mutex is held, so a
//! reset can never land between scoring a record and publishing it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::PipelineResult;
use crate::pipeline::{DetectionPipeline, PipelineConfig, PipelineStatus};
use crate::record::FeatureRecord;
use crate::state::{LatestReading, StateStore};
use crate::traits::AnomalyScorer;

struct Inner<S: AnomalyScorer> {
    pipeline: DetectionPipeline<S>,
    sequence: u64,
}

/// Cloneable handle to the one pipeline of the process
pub struct Monitor<S: AnomalyScorer> {
    inner: Arc<Mutex<Inner<S>>>,
    store: StateStore,
}

impl<S: AnomalyScorer> Clone for Monitor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            store: self.store.clone(),
        }
    }
}

impl<S: AnomalyScorer> Monitor<S> {
    /// Wrap a new pipeline built from `scorer` and `config`
    pub fn new(scorer: S, config: PipelineConfig) -> Self {
        Self::from_pipeline(DetectionPipeline::new(scorer, config))
    }

    /// Wrap an existing pipeline
    pub fn from_pipeline(pipeline: DetectionPipeline<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                pipeline,
                sequence: 0,
            })),
            store: StateStore::new(),
        }
    }

    /// Run a record through the pipeline and publish the enriched reading
    ///
    /// Nothing is published when the pipeline reports an error.
    pub fn process(&self, record: &FeatureRecord) -> PipelineResult<Arc<LatestReading>> {
        let mut inner = self.inner.lock();
        let assessment = inner.pipeline.assess(record)?;

        inner.sequence += 1;
        let reading = LatestReading::new(inner.sequence, record, &assessment);
        Ok(self.store.publish(reading))
    }

    /// Latest published reading
    pub fn latest(&self) -> Option<Arc<LatestReading>> {
        self.store.read()
    }

    /// Reset the shared pipeline and clear the published reading
    pub fn reset(&self) -> PipelineStatus {
        let mut inner = self.inner.lock();
        inner.pipeline.reset();
        inner.sequence = 0;
        self.store.clear();
        inner.pipeline.status()
    }

    /// Snapshot of the pipeline
    pub fn status(&self) -> PipelineStatus {
        self.inner.lock().pipeline.status()
    }

    /// Inspect the pipeline under the lock
    pub fn with_pipeline<R>(&self, f: impl FnOnce(&DetectionPipeline<S>) -> R) -> R {
        f(&self.inner.lock().pipeline)
    }

    /// The store readers poll
    pub fn store(&self) -> &StateStore {
        &self.store
    }
}
