//! Command line configuration of the harness.

use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;

/// Default per-phase timeout.
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(60);

/// Load generator and protocol validation harness for the wschat hub.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct HarnessArgs {
    /// Address to connect to (with protocol), e.g. ws://127.0.0.1:8000/
    #[arg(long)]
    pub addr: Option<String>,

    /// Number of connections
    #[arg(short = 'c', long = "connections", default_value_t = 1)]
    pub connections: usize,

    /// Number of messages to be sent from each connection
    #[arg(long, default_value_t = 1)]
    pub mpc: usize,

    /// Start all workers at the same time (after each has connected)
    #[arg(long)]
    pub same_start: bool,

    /// Print the elapsed seconds when done
    #[arg(long)]
    pub time: bool,

    /// Run in test mode (messages from the server will be checked)
    #[arg(long)]
    pub test: bool,

    /// Max duration to connect and read/write for (e.g. 1m, 30s, 1m30s, 500ms)
    #[arg(long, default_value = "1m", value_parser = parse_duration)]
    pub test_timeout: Duration,
}

/// Validated settings shared by every worker of a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub addr: String,
    pub connections: usize,
    pub messages_per_connection: usize,
    pub same_start: bool,
    pub timeout: Duration,
}

impl HarnessArgs {
    /// Validate the arguments into run settings.
    ///
    /// # Errors
    ///
    /// `MissingAddr` when no address is given, `InvalidAddr` when it is not a
    /// `ws://` or `wss://` URL.
    pub fn settings(&self) -> Result<RunSettings, ConfigError> {
        let addr = self
            .addr
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .ok_or(ConfigError::MissingAddr)?;

        let url = url::Url::parse(addr).map_err(|e| ConfigError::InvalidAddr {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::InvalidAddr {
                addr: addr.to_string(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }

        Ok(RunSettings {
            addr: addr.to_string(),
            connections: self.connections,
            messages_per_connection: self.mpc,
            same_start: self.same_start,
            timeout: self.test_timeout,
        })
    }
}

/// Parse a duration such as `1m`, `30s`, `1m30s`, `1.5s` or `250ms`.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let invalid = || format!("invalid duration {input:?}");

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest.find(is_number).unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => return Err(format!("missing unit in duration {input:?}")),
            unit => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };
        total += value * scale;
        rest = &rest[unit_len..];
    }

    Duration::try_from_secs_f64(total).map_err(|_| invalid())
}
