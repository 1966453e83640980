//! services/station/src/outbox.rs
//!
//! The remote mirror outbox.
//!
//! Every persist hands a full snapshot to the outbox and moves on. A single
//! background worker delivers the queued snapshots to the server in order,
//! once each, and publishes how each delivery went. Nothing is retried and
//! nothing flows back into the inventory store.

use laundry_core::domain::LaundryState;
use laundry_core::ports::{MirrorOutbox, RemoteStateService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of one mirror job, observable by anyone holding a receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    Delivered { job_id: Uuid },
    Failed { job_id: Uuid, error: String },
}

struct MirrorJob {
    id: Uuid,
    state: LaundryState,
}

//=========================================================================================
// The Sending Half (handed to the store)
//=========================================================================================

/// Queues snapshots for the worker. Cheap to clone.
#[derive(Clone)]
pub struct MirrorQueue {
    sender: mpsc::UnboundedSender<MirrorJob>,
    events: broadcast::Sender<MirrorEvent>,
}

impl MirrorQueue {
    /// Subscribes to delivery outcomes of jobs queued from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MirrorEvent> {
        self.events.subscribe()
    }
}

impl MirrorOutbox for MirrorQueue {
    fn enqueue(&self, state: LaundryState) -> Uuid {
        let id = Uuid::new_v4();
        if self.sender.send(MirrorJob { id, state }).is_err() {
            warn!(job_id = %id, "Mirror worker is gone; snapshot kept locally only");
        }
        id
    }
}

//=========================================================================================
// The Worker
//=========================================================================================

/// Handle on the running worker, used at shutdown.
pub struct MirrorWorker {
    handle: JoinHandle<()>,
    token: CancellationToken,
}

/// Starts the worker and returns the queue that feeds it.
pub fn spawn_mirror(remote: Arc<dyn RemoteStateService>) -> (MirrorQueue, MirrorWorker) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let (events, _) = broadcast::channel(64);
    let token = CancellationToken::new();

    let handle = tokio::spawn(run_worker(remote, receiver, events.clone(), token.clone()));

    (
        MirrorQueue { sender, events },
        MirrorWorker { handle, token },
    )
}

async fn run_worker(
    remote: Arc<dyn RemoteStateService>,
    mut receiver: mpsc::UnboundedReceiver<MirrorJob>,
    events: broadcast::Sender<MirrorEvent>,
    token: CancellationToken,
) {
    info!("Mirror worker started.");
    loop {
        let job = tokio::select! {
            _ = token.cancelled() => {
                info!("Mirror worker cancelled.");
                return;
            }
            job = receiver.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let outcome = tokio::select! {
            _ = token.cancelled() => {
                warn!(job_id = %job.id, "Mirror worker cancelled mid-delivery.");
                return;
            }
            outcome = remote.push_snapshot(&job.state) => outcome,
        };

        let event = match outcome {
            Ok(()) => {
                debug!(job_id = %job.id, "Snapshot mirrored");
                MirrorEvent::Delivered { job_id: job.id }
            }
            Err(e) => {
                warn!(job_id = %job.id, "API save failed, using local storage only: {}", e);
                MirrorEvent::Failed {
                    job_id: job.id,
                    error: e.to_string(),
                }
            }
        };
        // Nobody listening is fine.
        let _ = events.send(event);
    }
    info!("Mirror worker drained.");
}

impl MirrorWorker {
    /// Waits for queued jobs to drain once every queue handle is dropped,
    /// cancelling the worker if that takes longer than `grace`.
    pub async fn shutdown(self, grace: Duration) {
        let MirrorWorker { mut handle, token } = self;
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(_) => {}
            Err(_) => {
                warn!("Mirror worker did not drain within {:?}; cancelling", grace);
                token.cancel();
                let _ = handle.await;
            }
        }
    }
}
