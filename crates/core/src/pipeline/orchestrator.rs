use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::format::infrastructure::writer_factory::create_writer;
use crate::pipeline::batch_runner::{self, is_audio_file};
use crate::pipeline::job::{Job, JobState, TranscriptionRequest};
use crate::pipeline::progress_estimator;
use crate::pipeline::transcribe_file_use_case::{PipelineError, TranscribeFileUseCase};
use crate::shared::constants::PROGRESS_TICK_MS;
use crate::transcription::domain::device;
use crate::transcription::domain::engine::{InferenceEngine, TranscribeOptions};
use crate::transcription::infrastructure::device_probe;

/// Messages sent from the worker thread to observers.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Status(String),
    FileDone(PathBuf),
    FileFailed(PathBuf, String),
    Complete,
    Cancelled,
    Failed(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StartError {
    #[error("a transcription job is already running")]
    AlreadyRunning,
    #[error("input path does not exist: {0}")]
    InvalidInput(PathBuf),
}

type CapabilityProbe = Arc<dyn Fn() -> bool + Send + Sync>;

/// Owns the active job and drives it through the pipeline.
///
/// `start` spawns one worker thread for the pipeline and one ticker thread
/// for heuristic progress, sharing a cancellation token. The worker is the
/// sole mutator of the job record except for `progress`, which the ticker
/// advances while the state stays `Running`. Callers observe through cloned
/// snapshots and the event channel, never through the record itself.
pub struct TranscriptionOrchestrator {
    job: Arc<Mutex<Job>>,
    cancelled: Arc<AtomicBool>,
    probe: CapabilityProbe,
    worker: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
    // Threads from a superseded job; a cancelled worker may still be
    // finishing its current file when the next job starts.
    retired: Vec<JoinHandle<()>>,
}

impl TranscriptionOrchestrator {
    pub fn new() -> Self {
        Self::with_probe(Arc::new(device_probe::accelerated_available))
    }

    /// Override the hardware capability probe (tests, embedding).
    pub fn with_probe(probe: CapabilityProbe) -> Self {
        Self {
            job: Arc::new(Mutex::new(Job::new())),
            cancelled: Arc::new(AtomicBool::new(false)),
            probe,
            worker: None,
            ticker: None,
            retired: Vec::new(),
        }
    }

    /// Read-only view of the current job.
    pub fn snapshot(&self) -> Job {
        lock(&self.job).clone()
    }

    /// Begin a new job. Rejects while one is `Running`; from any terminal
    /// state the job record is replaced, not reused.
    ///
    /// Returns immediately; pipeline work happens on the worker thread and
    /// is observable through [`snapshot`](Self::snapshot) and the returned
    /// event channel.
    pub fn start(
        &mut self,
        request: TranscriptionRequest,
        engine: Box<dyn InferenceEngine>,
    ) -> Result<Receiver<WorkerEvent>, StartError> {
        if lock(&self.job).state == JobState::Running {
            return Err(StartError::AlreadyRunning);
        }
        if !request.input.exists() {
            return Err(StartError::InvalidInput(request.input));
        }

        self.retire_threads();

        // Fresh record and fresh token so a stale worker finishing its last
        // file can neither mutate the new job nor cancel it.
        let mut job = Job::new();
        job.state = JobState::Running;
        job.message = "Starting transcription...".to_string();
        self.job = Arc::new(Mutex::new(job));
        self.cancelled = Arc::new(AtomicBool::new(false));

        let (tx, rx) = crossbeam_channel::unbounded();

        let ticker_job = self.job.clone();
        self.ticker = Some(thread::spawn(move || {
            loop {
                thread::sleep(Duration::from_millis(PROGRESS_TICK_MS));
                let mut job = lock(&ticker_job);
                if job.state != JobState::Running {
                    break;
                }
                job.progress = progress_estimator::advance(job.progress);
            }
        }));

        let worker_job = self.job.clone();
        let worker_cancelled = self.cancelled.clone();
        let worker_probe = self.probe.clone();
        self.worker = Some(thread::spawn(move || {
            run_pipeline(
                request,
                engine,
                &worker_job,
                &worker_cancelled,
                &worker_probe,
                &tx,
            );
        }));

        Ok(rx)
    }

    /// Request cancellation of the running job. No-op in any other state.
    ///
    /// The flag is honored cooperatively at pipeline checkpoints; the worker
    /// may still be finishing the current file after this returns.
    pub fn cancel(&self) {
        let mut job = lock(&self.job);
        if job.state == JobState::Running {
            self.cancelled.store(true, Ordering::Relaxed);
            job.state = JobState::Cancelled;
            job.message = "Cancelled by user".to_string();
            job.log_line("Transcription cancelled by user");
        }
    }

    fn retire_threads(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.retired.push(handle);
        }
        if let Some(handle) = self.ticker.take() {
            self.retired.push(handle);
        }
        // Reap whatever has already exited
        let mut still_running = Vec::new();
        for handle in self.retired.drain(..) {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                still_running.push(handle);
            }
        }
        self.retired = still_running;
    }
}

impl Default for TranscriptionOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TranscriptionOrchestrator {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        for handle in self
            .worker
            .take()
            .into_iter()
            .chain(self.ticker.take())
            .chain(self.retired.drain(..))
        {
            let _ = handle.join();
        }
    }
}

fn lock(job: &Arc<Mutex<Job>>) -> MutexGuard<'_, Job> {
    job.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn run_pipeline(
    request: TranscriptionRequest,
    engine: Box<dyn InferenceEngine>,
    job: &Arc<Mutex<Job>>,
    cancelled: &Arc<AtomicBool>,
    probe: &CapabilityProbe,
    tx: &Sender<WorkerEvent>,
) {
    let device = match device::resolve(request.device, probe()) {
        Ok(device) => device,
        Err(e) => {
            fail(job, tx, e.to_string());
            return;
        }
    };
    {
        let mut job = lock(job);
        job.log_line(format!(
            "Starting transcription with model: {} on {device}",
            request.model
        ));
    }

    let options = TranscribeOptions {
        device,
        language: request.language.clone(),
    };
    let use_case = TranscribeFileUseCase::new(
        engine,
        create_writer(request.format),
        options,
        request.format,
    )
    .with_cancel_token(cancelled.clone());

    if request.input.is_dir() {
        run_batch(&request.input, &use_case, job, cancelled, tx);
    } else {
        run_single(&request.input, &use_case, job, cancelled, tx);
    }
}

fn run_single(
    input: &Path,
    use_case: &TranscribeFileUseCase,
    job: &Arc<Mutex<Job>>,
    cancelled: &Arc<AtomicBool>,
    tx: &Sender<WorkerEvent>,
) {
    {
        let mut job = lock(job);
        job.message = format!("Transcribing: {}", input.display());
        job.log_line(format!("Transcribing: {}", input.display()));
    }

    match use_case.run(input) {
        Ok(output) => {
            let mut job = lock(job);
            job.log_line(format!("Transcription saved to: {}", output.display()));
            job.outputs.push(output.clone());
            if cancelled.load(Ordering::Relaxed) {
                // cancel() already flipped the visible state; the in-flight
                // file was finished, not interrupted
                let _ = tx.send(WorkerEvent::Cancelled);
            } else {
                job.state = JobState::Completed;
                job.progress = 100.0;
                job.message = "Transcription completed!".to_string();
                job.log_line("Transcription completed successfully!");
                drop(job);
                let _ = tx.send(WorkerEvent::FileDone(output));
                let _ = tx.send(WorkerEvent::Complete);
            }
        }
        Err(e) => {
            if cancelled.load(Ordering::Relaxed) {
                let _ = tx.send(WorkerEvent::Cancelled);
            } else {
                fail(job, tx, e.to_string());
            }
        }
    }
}

fn run_batch(
    dir: &Path,
    use_case: &TranscribeFileUseCase,
    job: &Arc<Mutex<Job>>,
    cancelled: &Arc<AtomicBool>,
    tx: &Sender<WorkerEvent>,
) {
    let on_file = |current: usize, total: usize, path: &Path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let message = format!("Transcribing file {current} of {total}: {name}");
        let mut job = lock(job);
        job.message = message.clone();
        job.log_line(message.clone());
        let _ = tx.send(WorkerEvent::Status(message));
    };

    let pipeline = |path: &Path| {
        let result = use_case.run(path);
        match &result {
            Ok(output) => {
                let mut job = lock(job);
                job.log_line(format!("Transcription saved to: {}", output.display()));
                job.outputs.push(output.clone());
                let _ = tx.send(WorkerEvent::FileDone(output.clone()));
            }
            Err(PipelineError::Cancelled) => {}
            Err(e) => {
                let mut job = lock(job);
                job.log_line(format!("Error processing {}: {e}", path.display()));
                job.errors.push((path.to_path_buf(), e.to_string()));
                let _ = tx.send(WorkerEvent::FileFailed(path.to_path_buf(), e.to_string()));
            }
        }
        result
    };

    match batch_runner::run(dir, &pipeline, &is_audio_file, cancelled, Some(&on_file)) {
        Ok(outcome) => {
            if cancelled.load(Ordering::Relaxed) {
                let _ = tx.send(WorkerEvent::Cancelled);
            } else {
                let mut job = lock(job);
                job.state = JobState::Completed;
                job.progress = 100.0;
                job.message = format!(
                    "Batch completed: {} transcribed, {} failed",
                    outcome.outputs.len(),
                    outcome.errors.len()
                );
                job.log_line("Transcription completed successfully!");
                drop(job);
                let _ = tx.send(WorkerEvent::Complete);
            }
        }
        Err(e) => {
            if cancelled.load(Ordering::Relaxed) {
                let _ = tx.send(WorkerEvent::Cancelled);
            } else {
                fail(job, tx, format!("Could not read {}: {e}", dir.display()));
            }
        }
    }
}

fn fail(job: &Arc<Mutex<Job>>, tx: &Sender<WorkerEvent>, message: String) {
    let mut job = lock(job);
    job.state = JobState::Failed;
    job.message = "Error occurred".to_string();
    job.log_line(format!("Error: {message}"));
    drop(job);
    let _ = tx.send(WorkerEvent::Failed(message));
}
