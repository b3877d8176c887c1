//! Running the simulation binary.
//!
//! The simulation is invoked as `<executable> N O K TA TP` and writes its
//! log (normally `proj2.out`) into the working directory itself; its
//! stdout and stderr are passed through untouched.

use crate::builder::impl_builder;
use crate::error::RunError;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Log file written by the simulation when no other path is given.
pub const DEFAULT_LOG: &str = "./proj2.out";

/// Wall-clock limit for one simulation run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RunConfig {
    /// Path to the simulation binary.
    pub executable: PathBuf,
    /// Number of trucks (N).
    pub trucks: u32,
    /// Number of cars (O).
    pub cars: u32,
    /// Ferry capacity in car units (K).
    pub capacity: u32,
    /// Upper bound on a vehicle's arrival delay, in microseconds (TA).
    pub max_arrival_us: u32,
    /// Upper bound on a crossing, in microseconds (TP).
    pub max_crossing_us: u32,
    pub timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::new(),
            trucks: 0,
            cars: 0,
            capacity: 0,
            max_arrival_us: 0,
            max_crossing_us: 0,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl_builder!(RunConfig, RunConfigBuilder {
    required {
        executable: PathBuf,
        trucks: u32,
        cars: u32,
        capacity: u32,
        max_arrival_us: u32,
        max_crossing_us: u32,
    }
    optional {
        timeout: Duration,
    }
});

impl RunConfig {
    /// Positional arguments passed to the simulation.
    pub fn args(&self) -> [String; 5] {
        [
            self.trucks.to_string(),
            self.cars.to_string(),
            self.capacity.to_string(),
            self.max_arrival_us.to_string(),
            self.max_crossing_us.to_string(),
        ]
    }

    /// The invocation as a shell-like string, for display.
    pub fn command_line(&self) -> String {
        let mut line = self.executable.display().to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }
}

/// Run the simulation to completion.
///
/// Returns `Ok` only for a zero exit status within the timeout.
pub fn run(config: &RunConfig) -> Result<(), RunError> {
    let mut cmd = Command::new(&config.executable);
    cmd.args(config.args()).stdin(Stdio::null());

    info!(
        executable = %config.executable.display(),
        trucks = config.trucks,
        cars = config.cars,
        capacity = config.capacity,
        "Running simulation"
    );
    debug!("Command: {:?}", cmd);

    let status = run_with_timeout(&mut cmd, config)?;
    if status.success() {
        info!("Simulation finished");
        Ok(())
    } else {
        Err(RunError::NonZeroExit {
            code: status.code(),
        })
    }
}

/// Spawn the command and poll it until it exits, killing it once the
/// timeout has elapsed.
fn run_with_timeout(cmd: &mut Command, config: &RunConfig) -> Result<ExitStatus, RunError> {
    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            RunError::NotFound {
                path: config.executable.clone(),
                reason: e.to_string(),
            }
        }
        _ => RunError::Io(e),
    })?;

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            debug!(elapsed = ?start.elapsed(), ?status, "Simulation exited");
            return Ok(status);
        }
        if start.elapsed() >= config.timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RunError::Timeout {
                duration: config.timeout,
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_every_parameter() {
        let err = RunConfig::builder()
            .executable("./proj2")
            .trucks(1u32)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("cars"), "{err}");
    }

    #[test]
    fn builder_fills_default_timeout() {
        let config = RunConfig::builder()
            .executable("./proj2")
            .trucks(3u32)
            .cars(2u32)
            .capacity(10u32)
            .max_arrival_us(5u32)
            .max_crossing_us(7u32)
            .build()
            .unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.command_line(), "./proj2 3 2 10 5 7");
    }
}
