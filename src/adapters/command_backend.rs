//! Forecast backend served by an external program.
//!
//! The program is spawned once per prediction as `program [args] <horizon_days>`.
//! The input series is written to its stdin as `date,close` lines and the
//! forecast is read back from stdout as `date,price` lines. Anything else
//! (spawn failure, non-zero exit, unparsable line) becomes a `BackendError`;
//! date alignment is checked by the pipeline, not here.
//!
//! With a timeout set, a child still running at the deadline is killed and
//! reaped before `Timeout` is returned.

use crate::domain::error::BackendError;
use crate::domain::forecast::ForecastPoint;
use crate::domain::price_series::PriceSeries;
use crate::ports::forecast_port::{BackendLoader, ForecastBackend};
use chrono::NaiveDate;
use std::env;
use std::fmt::Write as _;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::warn;

/// Longest stderr excerpt carried into an error.
const STDERR_EXCERPT: usize = 200;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct CommandBackend {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandBackend {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self {
            name,
            program,
            args,
            timeout: None,
        }
    }

    /// Kill the child if it has not exited after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, BackendError> {
        let failed = |e: std::io::Error| BackendError::Failed {
            reason: format!("failed to wait for {}: {}", self.name, e),
        };
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(failed);
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait().map_err(failed)? {
                Some(status) => return Ok(status),
                None if Instant::now() >= deadline => {
                    warn!(backend = %self.name, pid = child.id(), "forecast command timed out, killing it");
                    // kill fails only if the child already exited; wait reaps it either way
                    let _ = child.kill();
                    child.wait().map_err(failed)?;
                    return Err(BackendError::Timeout {
                        millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        }
    }
}

impl ForecastBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
    ) -> Result<Vec<ForecastPoint>, BackendError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(horizon_days.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BackendError::Unavailable {
                reason: format!("failed to start {}: {}", self.program.display(), e),
            })?;

        let (Some(mut stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BackendError::Failed {
                reason: "child pipes not captured".into(),
            });
        };

        // every pipe gets its own thread so a full buffer cannot stall the child
        let payload = encode_series(series);
        let writer = thread::spawn(move || match stdin.write_all(payload.as_bytes()) {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
            _ => Ok(()),
        });
        let stdout = drain(stdout);
        let stderr = drain(stderr);

        // on timeout the pipe threads are left to finish once the pipes close
        let status = self.wait(&mut child)?;
        let stdout = collect(stdout, "stdout")?;
        let stderr = collect(stderr, "stderr")?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(BackendError::Failed {
                    reason: format!("failed to write input: {}", e),
                });
            }
            Err(_) => {
                return Err(BackendError::Failed {
                    reason: "input writer panicked".into(),
                });
            }
        }

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT).collect();
            return Err(BackendError::Failed {
                reason: format!("{} exited with {}: {}", self.name, status, excerpt),
            });
        }

        parse_forecast(&stdout)
    }
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf).map(|_| buf)
    })
}

fn collect(
    handle: JoinHandle<std::io::Result<Vec<u8>>>,
    stream: &str,
) -> Result<Vec<u8>, BackendError> {
    match handle.join() {
        Ok(Ok(buf)) => Ok(buf),
        Ok(Err(e)) => Err(BackendError::Failed {
            reason: format!("failed to read {}: {}", stream, e),
        }),
        Err(_) => Err(BackendError::Failed {
            reason: format!("{} reader panicked", stream),
        }),
    }
}

fn encode_series(series: &PriceSeries) -> String {
    let mut out = String::with_capacity(series.len() * 20);
    for point in series.points() {
        let _ = writeln!(out, "{},{}", point.date.format("%Y-%m-%d"), point.close);
    }
    out
}

fn parse_forecast(stdout: &[u8]) -> Result<Vec<ForecastPoint>, BackendError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(stdout);

    let mut points = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| BackendError::Malformed {
            reason: format!("line {}: {}", i + 1, e),
        })?;
        if record.len() != 2 {
            return Err(BackendError::Malformed {
                reason: format!("line {}: expected 'date,price', got {} fields", i + 1, record.len()),
            });
        }
        let date = NaiveDate::parse_from_str(&record[0], "%Y-%m-%d").map_err(|e| {
            BackendError::Malformed {
                reason: format!("line {}: invalid date '{}': {}", i + 1, &record[0], e),
            }
        })?;
        let price: f64 = record[1].parse().map_err(|e| BackendError::Malformed {
            reason: format!("line {}: invalid price '{}': {}", i + 1, &record[1], e),
        })?;
        points.push(ForecastPoint { date, price });
    }
    Ok(points)
}

/// Loads a [`CommandBackend`] after checking that its program can be run.
#[derive(Debug, Clone)]
pub struct CommandBackendLoader {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandBackendLoader {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Deadline handed to every loaded [`CommandBackend`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl BackendLoader for CommandBackendLoader {
    fn load(&self) -> Result<Arc<dyn ForecastBackend>, BackendError> {
        let path = resolve_program(&self.program).ok_or_else(|| BackendError::Unavailable {
            reason: format!("{} not found or not executable", self.program),
        })?;
        let backend = CommandBackend::new(path, self.args.clone());
        Ok(Arc::new(match self.timeout {
            Some(timeout) => backend.with_timeout(timeout),
            None => backend,
        }))
    }
}

/// Bare names are looked up on `PATH`; anything with a separator is taken as
/// a path.
fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
