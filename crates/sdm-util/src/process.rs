use std::collections::HashMap;
use std::path::Path;
use std::process::{Output, Stdio};

use tokio::process::Command;

use crate::errors::SdmError;

/// Builder for constructing and executing external processes.
///
/// Provides a fluent API for setting program, arguments, environment variables,
/// and working directory. Execution is async so callers never block the runtime
/// while `git` talks to a remote.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<String>,
}

impl CommandBuilder {
    /// Create a new builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory for the child process.
    pub fn cwd(mut self, dir: impl Into<String>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Render the command line for log and error messages.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Execute the command and return its output, whatever the exit status.
    pub async fn exec(&self) -> Result<Output, SdmError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(Path::new(dir));
        }
        tracing::trace!("running `{}`", self.display());
        cmd.output().await.map_err(SdmError::from)
    }

    /// Execute the command and fail with [`SdmError::Generic`] on a non-zero exit.
    pub async fn exec_checked(&self) -> Result<Output, SdmError> {
        let output = self.exec().await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(SdmError::Generic {
                message: format!(
                    "`{}` failed: {}",
                    self.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }
}
