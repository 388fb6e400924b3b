//! Worker Pool
//!
//! A fixed pool of threads for asset I/O and coarse scene-side work. Jobs
//! carry their own result channels; GPU uploads stay on the render thread,
//! which consumes posted results before upload.
//!
//! Shutdown is cooperative: dropping the job sender lets each worker drain
//! what it already started and exit; `shutdown` then joins them. Queued but
//! unstarted jobs are dropped (best-effort cancellation).

use std::thread::JoinHandle;

/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    job_tx: Option<flume::Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `threads` workers (at least one).
    #[must_use]
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let (job_tx, job_rx) = flume::unbounded::<Job>();

        let handles = (0..threads)
            .map(|index| {
                let rx = job_rx.clone();
                std::thread::Builder::new()
                    .name(format!("lumen-worker-{index}"))
                    .spawn(move || {
                        while let Ok(job) = rx.recv() {
                            job();
                        }
                    })
                    .expect("worker thread spawn failed")
            })
            .collect();

        Self {
            job_tx: Some(job_tx),
            handles,
        }
    }

    /// Enqueues a job. Returns `false` after shutdown has begun.
    pub fn execute(&self, job: Job) -> bool {
        match &self.job_tx {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        }
    }

    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Stops accepting jobs, waits for in-flight work, joins every worker.
    pub fn shutdown(&mut self) {
        self.job_tx = None;
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("workers: a worker thread panicked during shutdown");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
