//! Subprocess execution with transcript capture

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::SkiffError;
use crate::transcript::Transcript;

/// One external command: program, arguments, and extra environment
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a command spec from a program and arguments
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            envs: Vec::new(),
        }
    }

    /// Build a spec from an argv-style list, as stored in settings
    pub fn from_argv(argv: &[String]) -> Result<Self, SkiffError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| SkiffError::ConfigError("empty command".to_string()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    /// Add environment variables to the spec
    pub fn with_envs(mut self, envs: Vec<(String, String)>) -> Self {
        self.envs = envs;
        self
    }

    /// Human-readable command line, for transcripts and logs
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// The result of running one external command to completion
#[derive(Debug)]
pub struct CommandExecution {
    pub exit_code: i32,
    pub output: String,
}

impl CommandExecution {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run a command to completion, appending its interleaved stdout and
/// stderr to the transcript as chunks arrive.
///
/// Chunks are appended in OS delivery order; no attempt is made to
/// deterministically order the two streams against each other. The
/// returned execution carries the combined output and exit code; a
/// non-zero exit is not an error at this layer.
pub async fn run_step(
    spec: &CommandSpec,
    cwd: &Path,
    transcript: &mut Transcript,
) -> Result<CommandExecution, SkiffError> {
    debug!("Running: {} (cwd: {})", spec.display(), cwd.display());

    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| SkiffError::ServerError("child stdout not captured".to_string()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| SkiffError::ServerError("child stderr not captured".to_string()))?;

    let mut output = String::new();
    let mut out_buf = [0u8; 4096];
    let mut err_buf = [0u8; 4096];
    let mut out_done = false;
    let mut err_done = false;

    // Drain both pipes from this task so transcript appends stay
    // single-writer and in arrival order.
    while !out_done || !err_done {
        tokio::select! {
            result = stdout.read(&mut out_buf), if !out_done => {
                let n = result?;
                if n == 0 {
                    out_done = true;
                } else {
                    let chunk = String::from_utf8_lossy(&out_buf[..n]).into_owned();
                    transcript.chunk(&chunk);
                    output.push_str(&chunk);
                }
            }
            result = stderr.read(&mut err_buf), if !err_done => {
                let n = result?;
                if n == 0 {
                    err_done = true;
                } else {
                    let chunk = String::from_utf8_lossy(&err_buf[..n]).into_owned();
                    transcript.chunk(&chunk);
                    output.push_str(&chunk);
                }
            }
        }
    }

    let status = child.wait().await?;
    let exit_code = status.code().unwrap_or(-1);
    debug!("Command exited with code {}: {}", exit_code, spec.display());

    Ok(CommandExecution { exit_code, output })
}
