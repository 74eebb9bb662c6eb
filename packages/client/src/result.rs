//! Per-worker results.

use std::time::{Duration, Instant};

use crate::error::HarnessError;

/// Outcome of one validation worker, published exactly once.
#[derive(Debug, Clone, Default)]
pub struct TestResult {
    pub worker_id: usize,
    /// Identity assigned by the hub in the connect handshake
    pub identity: Option<String>,

    pub connected: bool,
    pub connect_duration: Duration,
    pub connect_error: Option<HarnessError>,

    pub messages_sent: usize,
    pub send_duration: Duration,
    pub send_error: Option<HarnessError>,

    pub messages_received: usize,
    pub receive_duration: Duration,
    pub receive_error: Option<HarnessError>,
    /// Protocol reason the receive phase stopped early
    pub stop_reason: Option<HarnessError>,
    /// Error message sent by the hub
    pub server_error: Option<HarnessError>,

    pub connected_at: Option<Instant>,
    pub first_send_at: Option<Instant>,
}

impl TestResult {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    /// Connected and both sent and received exactly `expected` messages.
    pub fn passed(&self, expected: usize) -> bool {
        self.connected && self.messages_sent == expected && self.messages_received == expected
    }
}

/// What the receive task reports back to its worker.
#[derive(Debug, Clone, Default)]
pub struct ReceiveOutcome {
    pub messages_received: usize,
    pub duration: Duration,
    pub error: Option<HarnessError>,
    pub stop_reason: Option<HarnessError>,
    pub server_error: Option<HarnessError>,
}

impl ReceiveOutcome {
    pub fn apply_to(self, result: &mut TestResult) {
        result.messages_received = self.messages_received;
        result.receive_duration = self.duration;
        result.receive_error = self.error;
        result.stop_reason = self.stop_reason;
        result.server_error = self.server_error;
    }
}
