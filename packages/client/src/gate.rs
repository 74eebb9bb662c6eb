//! Same-start barrier.
//!
//! Every worker reports readiness exactly once, right after its connection
//! attempt (successful or not). The coordinator releases the gate after all
//! of them have reported, or once no worker can report any more.

use tokio::sync::{mpsc, watch};

/// Worker side of the barrier.
#[derive(Debug, Clone)]
pub struct StartGate {
    ready: mpsc::Sender<()>,
    release: watch::Receiver<bool>,
}

/// Coordinator side of the barrier.
#[derive(Debug)]
pub struct GateController {
    ready: mpsc::Receiver<()>,
    release: watch::Sender<bool>,
    participants: usize,
}

/// Barrier for `participants` workers.
pub fn start_gate(participants: usize) -> (GateController, StartGate) {
    let (ready_tx, ready_rx) = mpsc::channel(participants.max(1));
    let (release_tx, release_rx) = watch::channel(false);
    (
        GateController {
            ready: ready_rx,
            release: release_tx,
            participants,
        },
        StartGate {
            ready: ready_tx,
            release: release_rx,
        },
    )
}

impl StartGate {
    /// Report readiness.
    pub async fn arrive(&self) {
        let _ = self.ready.send(()).await;
    }

    /// Block until the gate is released. Returns at once if the coordinator
    /// is gone.
    pub async fn wait(&mut self) {
        let _ = self.release.wait_for(|open| *open).await;
    }
}

impl GateController {
    /// Wait for every participant and open the gate.
    ///
    /// Returns the number of arrivals seen, which is lower than the number of
    /// participants only if some worker dropped its gate without arriving.
    pub async fn release_when_ready(mut self) -> usize {
        let mut arrived = 0;
        while arrived < self.participants {
            match self.ready.recv().await {
                Some(()) => arrived += 1,
                None => break,
            }
        }
        let _ = self.release.send(true);
        arrived
    }
}
