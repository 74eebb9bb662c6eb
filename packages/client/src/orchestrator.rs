//! Spawns the workers of a run and gathers what they report.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{sync::mpsc, task::JoinSet};

use crate::{
    config::RunSettings,
    connector::{Connector, TungsteniteConnector},
    gate::{GateController, StartGate, start_gate},
    load::run_load_worker,
    report::Aggregator,
    result::TestResult,
    runner::TestRunner,
};

pub struct Orchestrator {
    settings: Arc<RunSettings>,
    connector: Arc<dyn Connector>,
}

impl Orchestrator {
    pub fn new(settings: RunSettings) -> Self {
        Self::with_connector(settings, Arc::new(TungsteniteConnector))
    }

    pub fn with_connector(settings: RunSettings, connector: Arc<dyn Connector>) -> Self {
        Self {
            settings: Arc::new(settings),
            connector,
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Validation mode: run every worker and aggregate their results.
    pub async fn run_validation(&self) -> Aggregator {
        let results = self.dispatch_validation().await;
        Aggregator::collect(
            results,
            self.settings.connections,
            self.settings.messages_per_connection,
        )
        .await
    }

    /// Spawn the validation workers and hand back the channel their results
    /// arrive on. Returns after the same-start gate (if any) has opened.
    pub async fn dispatch_validation(&self) -> mpsc::Receiver<TestResult> {
        let n = self.settings.connections;
        let (results_tx, results_rx) = mpsc::channel(n.max(1));
        let (controller, gate) = self.barrier();

        for worker_id in 1..=n {
            let runner = TestRunner::new(
                worker_id,
                self.settings.clone(),
                self.connector.clone(),
                gate.clone(),
            );
            let results_tx = results_tx.clone();
            tokio::spawn(async move {
                let result = runner.run().await;
                if results_tx.send(result).await.is_err() {
                    tracing::warn!("Worker #{}: result dropped, collector is gone", worker_id);
                }
            });
        }
        drop(gate);

        if let Some(controller) = controller {
            release(controller).await;
        }
        results_rx
    }

    /// Load mode: run every worker to completion and return the elapsed wall
    /// time.
    pub async fn run_load(&self) -> Duration {
        let start = Instant::now();
        let (controller, gate) = self.barrier();

        let mut workers = JoinSet::new();
        for worker_id in 1..=self.settings.connections {
            let settings = self.settings.clone();
            let connector = self.connector.clone();
            let gate = gate.clone();
            workers.spawn(async move {
                (
                    worker_id,
                    run_load_worker(worker_id, settings, connector, gate).await,
                )
            });
        }
        drop(gate);

        if let Some(controller) = controller {
            release(controller).await;
        }

        let mut total_sent = 0;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((_, Ok(sent))) => total_sent += sent,
                Ok((worker_id, Err(e))) => tracing::warn!("Worker #{}: {}", worker_id, e),
                Err(e) => tracing::error!("Load worker panicked: {}", e),
            }
        }

        let elapsed = start.elapsed();
        tracing::info!(
            "Load run finished: {} messages in {:.3}s",
            total_sent,
            elapsed.as_secs_f64()
        );
        elapsed
    }

    fn barrier(&self) -> (Option<GateController>, Option<StartGate>) {
        if self.settings.same_start {
            let (controller, gate) = start_gate(self.settings.connections);
            (Some(controller), Some(gate))
        } else {
            (None, None)
        }
    }
}

async fn release(controller: GateController) {
    let arrived = controller.release_when_ready().await;
    tracing::debug!("Start gate opened after {} arrivals", arrived);
}
