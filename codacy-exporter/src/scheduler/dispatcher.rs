//! Job dispatcher
//!
//! A fixed pool of workers draining one shared queue. `submit` never waits:
//! the producer enqueues every job up front while the workers pull them at
//! their own pace, one job at a time each, so at most `workers` jobs are in
//! flight at any instant.

use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::scheduler::job::Job;

type JobQueue = Arc<Mutex<mpsc::UnboundedReceiver<Job>>>;

/// Bounded-concurrency executor of jobs
pub struct Dispatcher {
    name: String,
    sender: mpsc::UnboundedSender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Starts a dispatcher with `workers` workers (at least one)
    pub fn new(name: impl Into<String>, workers: usize) -> Self {
        let name = name.into();
        let workers = workers.max(1);
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue: JobQueue = Arc::new(Mutex::new(receiver));

        info!("Starting dispatcher {} with {} worker(s)", name, workers);

        let workers = (0..workers)
            .map(|worker_id| {
                tokio::spawn(Self::worker_loop(
                    name.clone(),
                    worker_id,
                    Arc::clone(&queue),
                ))
            })
            .collect();

        Self {
            name,
            sender,
            workers,
        }
    }

    /// Number of workers in the pool
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Enqueues a job for execution and returns immediately
    pub fn submit(&self, job: Job) {
        debug!("Submitting job {} for {}", job.id, job.repository);

        if let Err(mpsc::error::SendError(job)) = self.sender.send(job) {
            // Dropping the job records a failure through its completion handle
            error!(
                "Dispatcher {} is closed, dropping job {} for {}",
                self.name, job.id, job.repository
            );
        }
    }

    /// Closes the queue and waits for the workers to drain it
    pub async fn shutdown(self) {
        let Dispatcher {
            name,
            sender,
            workers,
        } = self;
        drop(sender);

        for worker in workers {
            if let Err(e) = worker.await {
                warn!("Worker of dispatcher {} terminated abnormally: {}", name, e);
            }
        }

        debug!("Dispatcher {} stopped", name);
    }

    async fn worker_loop(name: String, worker_id: usize, queue: JobQueue) {
        debug!("Worker {}-{} started", name, worker_id);

        loop {
            let job = {
                let mut receiver = queue.lock().await;
                receiver.recv().await
            };

            let Some(job) = job else {
                break;
            };

            let (job_id, repository) = (job.id, job.repository.clone());
            debug!(
                "Worker {}-{} picked job {} for {}",
                name, worker_id, job_id, repository
            );

            let outcome = job.execute().await;
            debug!(
                "Worker {}-{} finished job {} for {}: {}",
                name, worker_id, job_id, repository, outcome
            );
        }

        debug!("Worker {}-{} stopped", name, worker_id);
    }
}
