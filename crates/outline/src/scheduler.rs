use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use image::RgbaImage;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    error::OutlineError,
    session::OutlineSession,
    types::OutlineParameters,
};

/// Quiet period after the last parameter change before a render starts
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Progress of the most recent render, as seen by observers
#[derive(Debug, Clone)]
pub enum RenderStatus {
    Idle,
    Processing,
    Completed(Arc<RgbaImage>),
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
struct RenderRequest {
    params: Option<OutlineParameters>,
    immediate: bool,
}

impl RenderRequest {
    /// The newer request wins; parameters carry over when it has none
    fn supersede(self, newer: RenderRequest) -> RenderRequest {
        RenderRequest {
            params: newer.params.or(self.params),
            immediate: self.immediate || newer.immediate,
        }
    }
}

/// Serializes renders of a shared [`OutlineSession`].
///
/// Triggers are coalesced into a single pending request; debounced triggers
/// wait for a quiet window, and at most one render runs at a time. Renders
/// execute on the blocking pool so async callers are never stalled.
pub struct RenderScheduler {
    requests: mpsc::UnboundedSender<RenderRequest>,
    status: watch::Receiver<RenderStatus>,
    runs: Arc<AtomicUsize>,
    worker: JoinHandle<()>,
}

impl RenderScheduler {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(session: Arc<Mutex<OutlineSession>>, debounce: Duration) -> Self {
        let (requests, receiver) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(RenderStatus::Idle);
        let runs = Arc::new(AtomicUsize::new(0));

        let worker = tokio::spawn(run_worker(
            session,
            receiver,
            status_tx,
            debounce,
            Arc::clone(&runs),
        ));

        Self {
            requests,
            status,
            runs,
            worker,
        }
    }

    /// Debounced trigger carrying new parameters
    pub fn update_parameters(&self, params: OutlineParameters) {
        self.send(RenderRequest {
            params: Some(params),
            immediate: false,
        });
    }

    /// Render as soon as the worker is free
    pub fn render_now(&self) {
        self.send(RenderRequest {
            params: None,
            immediate: true,
        });
    }

    fn send(&self, request: RenderRequest) {
        if self.requests.send(request).is_err() {
            warn!("render worker has stopped; trigger dropped");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderStatus> {
        self.status.clone()
    }

    pub fn status(&self) -> RenderStatus {
        self.status.borrow().clone()
    }

    /// Number of renders that actually reached the pipeline
    pub fn runs_started(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Stop accepting triggers, let the worker finish what is queued
    pub async fn shutdown(self) {
        drop(self.requests);
        if let Err(e) = self.worker.await {
            error!("render worker ended abnormally: {e}");
        }
    }
}

fn lock(session: &Mutex<OutlineSession>) -> MutexGuard<'_, OutlineSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run_worker(
    session: Arc<Mutex<OutlineSession>>,
    mut receiver: mpsc::UnboundedReceiver<RenderRequest>,
    status: watch::Sender<RenderStatus>,
    debounce: Duration,
    runs: Arc<AtomicUsize>,
) {
    while let Some(first) = receiver.recv().await {
        let mut pending = first;

        loop {
            if pending.immediate {
                match receiver.try_recv() {
                    Ok(next) => {
                        pending = pending.supersede(next);
                        continue;
                    }
                    Err(_) => break,
                }
            }
            match tokio::time::timeout(debounce, receiver.recv()).await {
                Ok(Some(next)) => pending = pending.supersede(next),
                // Closed or quiet: render what we have
                Ok(None) | Err(_) => break,
            }
        }

        render_once(&session, pending, &status, &runs).await;
    }
    debug!("render worker stopped");
}

async fn render_once(
    session: &Arc<Mutex<OutlineSession>>,
    request: RenderRequest,
    status: &watch::Sender<RenderStatus>,
    runs: &AtomicUsize,
) {
    let job = {
        let mut guard = lock(session);
        if let Some(params) = request.params {
            guard.set_parameters(params);
        }
        match guard.begin_run() {
            Ok(job) => job,
            Err(OutlineError::SourceUnavailable) => {
                debug!("no source image; render trigger ignored");
                return;
            }
            Err(e) => {
                warn!(error = %e, "render trigger rejected");
                return;
            }
        }
    };

    runs.fetch_add(1, Ordering::SeqCst);
    status.send_replace(RenderStatus::Processing);
    // Let observers see Processing before the pixel loops start
    tokio::task::yield_now().await;

    let params = *job.params();
    let outcome = match tokio::task::spawn_blocking(move || job.run()).await {
        Ok(outcome) => outcome,
        Err(e) => Err(OutlineError::RenderTask(e.to_string())),
    };

    let finished = lock(session).finish_run(outcome);
    match finished {
        Ok(result) => {
            info!(
                thickness = params.thickness_factor,
                smoothing = params.smoothing_factor,
                width = result.image.width(),
                height = result.image.height(),
                "scheduled render completed"
            );
            status.send_replace(RenderStatus::Completed(result.image));
        }
        Err(e) => {
            error!(error = %e, "scheduled render failed");
            status.send_replace(RenderStatus::Failed(e.to_string()));
        }
    }
}
