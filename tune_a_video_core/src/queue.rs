use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Instant,
};

use anyhow::Result;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::info;

use crate::{
    pipeline::{InferencePipeline, VideoArtifact},
    request::GenerationRequest,
};

/// Snapshot of the queue's load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub waiting: usize,
    pub running: usize,
    pub workers: usize,
}

/// Counts a job in one phase for as long as it is alive, including when the caller
/// stops waiting.
struct PhaseGuard(Arc<AtomicUsize>);

impl PhaseGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// First-come first-served access to an [`InferencePipeline`].
///
/// At most `workers` runs execute at once; the rest wait in arrival order.
#[derive(Clone)]
pub struct GenerationQueue {
    pipeline: Arc<dyn InferencePipeline>,
    permits: Arc<Semaphore>,
    waiting: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
    workers: usize,
}

impl GenerationQueue {
    pub fn new(pipeline: Arc<dyn InferencePipeline>, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            pipeline,
            permits: Arc::new(Semaphore::new(workers)),
            waiting: Arc::new(AtomicUsize::new(0)),
            running: Arc::new(AtomicUsize::new(0)),
            workers,
        }
    }

    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            waiting: self.waiting.load(Ordering::SeqCst),
            running: self.running.load(Ordering::SeqCst),
            workers: self.workers,
        }
    }

    /// Wait for a free worker, then run `request` on the blocking pool.
    pub async fn submit(&self, request: GenerationRequest) -> Result<VideoArtifact> {
        let waiting = PhaseGuard::enter(&self.waiting);
        info!(
            prompt_preview = %request.prompt_preview(),
            model_id = %request.model_id,
            status = ?self.status(),
            "queued generation request"
        );
        let permit = self.permits.clone().acquire_owned().await?;
        drop(waiting);

        let running = PhaseGuard::enter(&self.running);
        let pipeline = self.pipeline.clone();
        let start = Instant::now();
        let artifact = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _running = running;
            pipeline.run(&request)
        })
        .await??;

        info!(
            path = %artifact.path.display(),
            elapsed = ?start.elapsed(),
            "generation complete"
        );
        Ok(artifact)
    }
}
