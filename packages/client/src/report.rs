//! Result aggregation and the summary report.

use std::{
    collections::VecDeque,
    io::{self, Write},
    time::Duration,
};

use tokio::sync::mpsc;

use crate::{error::HarnessError, result::TestResult};

/// Count and timing of one phase outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    count: usize,
    total: Duration,
    min: Option<Duration>,
    max: Duration,
}

impl PhaseStats {
    pub fn record(&mut self, duration: Duration) {
        self.count += 1;
        self.total += duration;
        self.min = Some(self.min.map_or(duration, |min| min.min(duration)));
        self.max = self.max.max(duration);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn min(&self) -> Duration {
        self.min.unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn average(&self) -> Duration {
        average(self.total, self.count)
    }
}

/// Messages actually transferred by failed phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountStats {
    count: usize,
    sum: usize,
    min: Option<usize>,
    max: usize,
}

impl CountStats {
    pub fn record(&mut self, value: usize) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min(&self) -> usize {
        self.min.unwrap_or_default()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseOutcomes {
    pub passed: PhaseStats,
    pub failed: PhaseStats,
}

impl PhaseOutcomes {
    fn attempts(&self) -> usize {
        self.passed.count + self.failed.count
    }

    fn average(&self) -> Duration {
        average(self.passed.total + self.failed.total, self.attempts())
    }
}

/// Every error observed during a run, by category, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    pub connect: VecDeque<HarnessError>,
    pub send: VecDeque<HarnessError>,
    pub receive: VecDeque<HarnessError>,
    pub stop_reasons: VecDeque<HarnessError>,
    pub server: VecDeque<HarnessError>,
}

impl ErrorLog {
    pub fn len(&self) -> usize {
        self.connect.len()
            + self.send.len()
            + self.receive.len()
            + self.stop_reasons.len()
            + self.server.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    expected_messages: usize,
    total: usize,
    passed: usize,
    pub connect: PhaseOutcomes,
    pub send: PhaseOutcomes,
    pub receive: PhaseOutcomes,
    pub failed_sent: CountStats,
    pub failed_received: CountStats,
    errors: ErrorLog,
}

impl Aggregator {
    /// Empty aggregator for runs sending `expected_messages` per connection.
    pub fn new(expected_messages: usize) -> Self {
        Self {
            expected_messages,
            ..Self::default()
        }
    }

    /// Consume `n` results, or fewer if every producer is gone.
    pub async fn collect(
        mut results: mpsc::Receiver<TestResult>,
        n: usize,
        expected_messages: usize,
    ) -> Self {
        let mut aggregator = Self::new(expected_messages);
        while aggregator.total < n {
            match results.recv().await {
                Some(result) => aggregator.record(result),
                None => {
                    tracing::warn!(
                        "Result channel closed after {} of {} results",
                        aggregator.total,
                        n
                    );
                    break;
                }
            }
        }
        aggregator
    }

    pub fn record(&mut self, result: TestResult) {
        self.total += 1;
        if result.passed(self.expected_messages) {
            self.passed += 1;
        }

        if !result.connected {
            self.connect.failed.record(result.connect_duration);
            if let Some(e) = result.connect_error {
                self.errors.connect.push_back(e);
            }
            return;
        }
        self.connect.passed.record(result.connect_duration);

        let expected = self.expected_messages;
        if result.messages_sent == expected {
            self.send.passed.record(result.send_duration);
        } else {
            self.send.failed.record(result.send_duration);
            self.failed_sent.record(result.messages_sent);
            if let Some(e) = result.send_error {
                self.errors.send.push_back(e);
            }
        }

        if result.messages_received == expected {
            self.receive.passed.record(result.receive_duration);
        } else {
            self.receive.failed.record(result.receive_duration);
            self.failed_received.record(result.messages_received);
            if let Some(e) = result.receive_error {
                self.errors.receive.push_back(e);
            } else if let Some(e) = result.stop_reason {
                self.errors.stop_reasons.push_back(e);
            } else if let Some(e) = result.server_error {
                self.errors.server.push_back(e);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorLog {
        self.errors
    }

    pub fn write_report(&self, out: &mut impl Write, elapsed: Duration) -> io::Result<()> {
        writeln!(out, "Total test time: {:.6} secs", secs(elapsed))?;
        writeln!(
            out,
            "{} passed, {} failed, {} total ({:.2}% passed)",
            self.passed(),
            self.failed(),
            self.total,
            self.pass_rate()
        )?;
        writeln!(out)?;

        writeln!(
            out,
            "Average time to connect (total): {:.6} secs",
            secs(self.connect.average())
        )?;
        if self.connect.passed.count() > 0 {
            writeln!(
                out,
                "\tMin, Average, Max time to connect (passed): {:.6}, {:.6}, {:.6} secs",
                secs(self.connect.passed.min()),
                secs(self.connect.passed.average()),
                secs(self.connect.passed.max())
            )?;
        }
        if self.connect.failed.count() > 0 {
            writeln!(
                out,
                "\tAverage, Max time to attempt connect (failed): {:.6}, {:.6} secs",
                secs(self.connect.failed.average()),
                secs(self.connect.failed.max())
            )?;
        }

        if self.connect.passed.count() == 0 {
            return Ok(());
        }

        write_transfer_phase(out, "send", "sent", &self.send, &self.failed_sent)?;
        write_transfer_phase(out, "receive", "received", &self.receive, &self.failed_received)
    }
}

fn write_transfer_phase(
    out: &mut impl Write,
    verb: &str,
    participle: &str,
    phase: &PhaseOutcomes,
    failed_counts: &CountStats,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "Average time to {verb} msgs (total): {:.6} secs",
        secs(phase.average())
    )?;
    if phase.passed.count() > 0 {
        writeln!(
            out,
            "\tMin, Average, Max time to {verb} msgs (passed): {:.6}, {:.6}, {:.6} secs",
            secs(phase.passed.min()),
            secs(phase.passed.average()),
            secs(phase.passed.max())
        )?;
    }
    if phase.failed.count() > 0 {
        writeln!(
            out,
            "\tMin, Average, Max time to {verb} msgs (failed): {:.6}, {:.6}, {:.6} secs",
            secs(phase.failed.min()),
            secs(phase.failed.average()),
            secs(phase.failed.max())
        )?;
        writeln!(
            out,
            "\t\tMin, Average, Max number of messages {participle} (failed): {}, {:.3}, {} msgs",
            failed_counts.min(),
            failed_counts.average(),
            failed_counts.max()
        )?;
    }
    Ok(())
}

fn average(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(count) => total / count,
        Err(_) => Duration::from_secs_f64(total.as_secs_f64() / count as f64),
    }
}

fn secs(duration: Duration) -> f64 {
    duration.as_secs_f64()
}
