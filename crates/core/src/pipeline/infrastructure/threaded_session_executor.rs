use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use thiserror::Error;

use crate::pipeline::session_config::{ConfigHandle, ConfigUpdate};
use crate::pipeline::vitals_result::VitalsResult;
use crate::pipeline::vitals_service::VitalsService;

pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("frame queue is full; frame dropped")]
    QueueFull,
    #[error("session worker has stopped")]
    WorkerStopped,
    #[error("session worker panicked")]
    WorkerPanicked,
}

/// What to do with a frame submitted while the queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Wait until the worker frees a slot.
    #[default]
    Block,
    /// Discard the incoming frame.
    DropNewest,
}

/// One encoded frame awaiting processing.
#[derive(Clone, Debug)]
pub struct FrameJob {
    pub bytes: Vec<u8>,
    /// Capture time in seconds; `None` stamps on arrival at the worker.
    pub timestamp: Option<f64>,
}

impl FrameJob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            timestamp: None,
        }
    }

    pub fn at(bytes: Vec<u8>, timestamp: f64) -> Self {
        Self {
            bytes,
            timestamp: Some(timestamp),
        }
    }
}

/// State handed back when the executor shuts down.
pub struct FinishedSession {
    pub service: VitalsService,
    /// Results produced but not yet taken from [`ThreadedSessionExecutor::results`].
    pub remaining: Vec<VitalsResult>,
    pub dropped_frames: usize,
}

/// Runs one session's frame processing on a dedicated worker thread.
///
/// Layout: `caller → bounded frame queue → worker [decode/detect/estimate] → results`
///
/// The single worker owns the [`VitalsService`], so frame N+1 is never
/// started before frame N (including its buffer update) has finished.
/// Configuration updates bypass the queue through the shared
/// [`ConfigHandle`] and take effect at the next frame the worker starts.
pub struct ThreadedSessionExecutor {
    job_tx: Sender<FrameJob>,
    result_rx: Receiver<VitalsResult>,
    handle: JoinHandle<VitalsService>,
    config: ConfigHandle,
    policy: OverflowPolicy,
    dropped_frames: usize,
}

impl ThreadedSessionExecutor {
    pub fn spawn(service: VitalsService, queue_capacity: usize, policy: OverflowPolicy) -> Self {
        let (job_tx, job_rx) = crossbeam_channel::bounded::<FrameJob>(queue_capacity.max(1));
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<VitalsResult>();
        let config = service.config_handle();
        let handle = spawn_worker(service, job_rx, result_tx);
        Self {
            job_tx,
            result_rx,
            handle,
            config,
            policy,
            dropped_frames: 0,
        }
    }

    pub fn config_handle(&self) -> ConfigHandle {
        self.config.clone()
    }

    pub fn configure(&self, update: &ConfigUpdate) {
        self.config.configure(update);
    }

    /// Queues a frame according to the overflow policy.
    pub fn submit(&mut self, job: FrameJob) -> Result<(), ExecutorError> {
        match self.policy {
            OverflowPolicy::Block => self
                .job_tx
                .send(job)
                .map_err(|_| ExecutorError::WorkerStopped),
            OverflowPolicy::DropNewest => match self.job_tx.try_send(job) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(_)) => {
                    self.dropped_frames += 1;
                    log::debug!("Frame queue full, dropped {} so far", self.dropped_frames);
                    Err(ExecutorError::QueueFull)
                }
                Err(TrySendError::Disconnected(_)) => Err(ExecutorError::WorkerStopped),
            },
        }
    }

    /// Results in frame order, as they become available.
    pub fn results(&self) -> &Receiver<VitalsResult> {
        &self.result_rx
    }

    pub fn dropped_frames(&self) -> usize {
        self.dropped_frames
    }

    /// Closes the queue, lets the worker drain it and returns the service.
    pub fn finish(self) -> Result<FinishedSession, ExecutorError> {
        let Self {
            job_tx,
            result_rx,
            handle,
            dropped_frames,
            ..
        } = self;
        drop(job_tx);

        let service = handle.join().map_err(|_| ExecutorError::WorkerPanicked)?;
        if dropped_frames > 0 {
            log::warn!("Dropped {dropped_frames} frames while the session queue was full");
        }
        Ok(FinishedSession {
            service,
            remaining: result_rx.try_iter().collect(),
            dropped_frames,
        })
    }
}

fn spawn_worker(
    mut service: VitalsService,
    job_rx: Receiver<FrameJob>,
    result_tx: Sender<VitalsResult>,
) -> JoinHandle<VitalsService> {
    std::thread::spawn(move || {
        for job in job_rx.iter() {
            service.logger_mut().metric("queue_depth", job_rx.len() as f64);
            let result = match job.timestamp {
                Some(t) => service.process_frame_at(&job.bytes, t),
                None => service.process_frame(&job.bytes),
            };
            if let Some(result) = result {
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        }
        service
    })
}
