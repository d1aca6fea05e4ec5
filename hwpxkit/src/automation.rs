//! Hand-off to an external word-processor automation engine
//!
//! Text replacement across the whole document and PDF export need the real word
//! processor. This crate only describes the work as an [`EngineJob`] and runs an
//! engine program on it under a hard timeout. A timed-out engine is killed and
//! reported; retrying is up to the caller.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Default limit for one engine run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Line the engine prints on stdout when the job succeeded
const SUCCESS_LINE: &str = "OK";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Failed to {action}: {source}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode engine job: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to start engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine '{program}' did not finish within {} seconds", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("Engine '{program}' failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Cannot convert path {0} for the engine")]
    PathTranslation(String),
}

impl AutomationError {
    fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        AutomationError::Io {
            action: action.into(),
            source,
        }
    }
}

/// One find-and-replace pair, applied to every occurrence in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReplacement {
    pub find: String,
    pub replace: String,
}

/// Work order for the engine: open `input`, replace text, save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineJob {
    pub input: String,
    #[serde(default)]
    pub replacements: Vec<TextReplacement>,
    /// Where to save the edited document; omitted means no HWPX output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_hwpx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_pdf: Option<String>,
}

impl EngineJob {
    pub fn new<P: AsRef<Path>>(input: P) -> Self {
        Self {
            input: path_string(input.as_ref()),
            replacements: Vec::new(),
            save_hwpx: None,
            save_pdf: None,
        }
    }

    pub fn with_replacements(mut self, pairs: Vec<(String, String)>) -> Self {
        self.replacements = pairs
            .into_iter()
            .map(|(find, replace)| TextReplacement { find, replace })
            .collect();
        self
    }

    pub fn save_hwpx<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.save_hwpx = Some(path_string(path.as_ref()));
        self
    }

    pub fn save_pdf<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.save_pdf = Some(path_string(path.as_ref()));
        self
    }

    /// Same job with every path rewritten from `/mnt/<drive>/..` to `<DRIVE>:\..`
    pub fn to_windows(&self) -> Result<Self, AutomationError> {
        let convert = |p: &Option<String>| p.as_deref().map(to_windows_path).transpose();
        Ok(Self {
            input: to_windows_path(&self.input)?,
            replacements: self.replacements.clone(),
            save_hwpx: convert(&self.save_hwpx)?,
            save_pdf: convert(&self.save_pdf)?,
        })
    }
}

fn path_string(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Something that can carry out an [`EngineJob`]
pub trait AutomationEngine {
    fn execute(&self, job: &EngineJob) -> Result<(), AutomationError>;
}

/// Runs `program args.. <job.json>` and waits for it with a timeout
///
/// The job file is written next to the input document so an engine on the other
/// side of a WSL boundary can reach it. Success means a zero exit status and an
/// `OK` line on stdout.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Hand the engine Windows paths (for a Windows program started from WSL)
    pub translate_paths: bool,
}

impl CommandEngine {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            translate_paths: false,
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    fn write_job_file(&self, job: &EngineJob) -> Result<tempfile::NamedTempFile, AutomationError> {
        let dir = Path::new(&job.input)
            .parent()
            .filter(|d| d.is_dir())
            .map_or_else(std::env::temp_dir, Path::to_path_buf);

        let mut file = tempfile::Builder::new()
            .prefix("hwpxkit-job-")
            .suffix(".json")
            .tempfile_in(&dir)
            .map_err(|e| AutomationError::io(format!("create job file in {}", dir.display()), e))?;

        let payload = if self.translate_paths {
            job.to_windows()?
        } else {
            job.clone()
        };
        serde_json::to_writer_pretty(file.as_file_mut(), &payload)?;
        file.as_file_mut()
            .flush()
            .map_err(|e| AutomationError::io("write job file", e))?;
        Ok(file)
    }
}

impl AutomationEngine for CommandEngine {
    fn execute(&self, job: &EngineJob) -> Result<(), AutomationError> {
        let job_file = self.write_job_file(job)?;
        let job_arg = if self.translate_paths {
            to_windows_path(&path_string(job_file.path()))?
        } else {
            path_string(job_file.path())
        };

        // Output goes to files so a chatty engine cannot block on a full pipe
        let mut stdout = tempfile::tempfile().map_err(|e| AutomationError::io("capture stdout", e))?;
        let mut stderr = tempfile::tempfile().map_err(|e| AutomationError::io("capture stderr", e))?;
        let stdout_handle = stdout.try_clone().map_err(|e| AutomationError::io("capture stdout", e))?;
        let stderr_handle = stderr.try_clone().map_err(|e| AutomationError::io("capture stderr", e))?;

        log::info!("Running engine {} on {}", self.program_name(), job.input);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&job_arg)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_handle))
            .stderr(Stdio::from(stderr_handle))
            .spawn()
            .map_err(|source| AutomationError::Spawn {
                program: self.program_name(),
                source,
            })?;

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= self.timeout => {
                    if let Err(e) = child.kill() {
                        log::warn!("Failed to kill engine {}: {}", self.program_name(), e);
                    }
                    if let Err(e) = child.wait() {
                        log::warn!("Failed to reap engine {}: {}", self.program_name(), e);
                    }
                    return Err(AutomationError::Timeout {
                        program: self.program_name(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(AutomationError::io("wait for engine", e)),
            }
        };

        let stdout = read_captured(&mut stdout)?;
        let stderr = read_captured(&mut stderr)?;
        if !stderr.trim().is_empty() {
            log::debug!("Engine stderr: {}", stderr.trim());
        }

        if status.success() && reports_success(&stdout) {
            log::info!("Engine finished in {:.1}s", started.elapsed().as_secs_f64());
            Ok(())
        } else {
            Err(AutomationError::Failed {
                program: self.program_name(),
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

fn read_captured(file: &mut File) -> Result<String, AutomationError> {
    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut bytes))
        .map_err(|e| AutomationError::io("read engine output", e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn reports_success(stdout: &str) -> bool {
    stdout.lines().any(|line| line.trim() == SUCCESS_LINE)
}

/// `/mnt/d/project/file.hwpx` -> `D:\project\file.hwpx`
pub fn to_windows_path(path: &str) -> Result<String, AutomationError> {
    let rest = path
        .strip_prefix("/mnt/")
        .ok_or_else(|| AutomationError::PathTranslation(path.to_string()))?;
    let mut parts = rest.split('/');
    let drive = parts
        .next()
        .filter(|d| d.len() == 1 && d.chars().all(|c| c.is_ascii_alphabetic()))
        .ok_or_else(|| AutomationError::PathTranslation(path.to_string()))?;
    let tail = parts.collect::<Vec<_>>().join("\\");
    Ok(format!("{}:\\{}", drive.to_ascii_uppercase(), tail))
}

/// `D:\project\file.hwpx` (or `D:/project/file.hwpx`) -> `/mnt/d/project/file.hwpx`
pub fn to_wsl_path(path: &str) -> Result<String, AutomationError> {
    let normalized = path.replace('\\', "/");
    let mut chars = normalized.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => Ok(format!(
            "/mnt/{}{}",
            drive.to_ascii_lowercase(),
            chars.as_str()
        )),
        _ => Err(AutomationError::PathTranslation(path.to_string())),
    }
}
