// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::process::{ExitStatus, Stdio};
use std::str::FromStr;

use futures::future;
use tokio::io::AsyncRead;
use tokio::process::{ChildStderr, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::config::LaunchConfig;
use crate::error::ErrorKind;
use crate::Error;

pub const DEFAULT_COMMAND: &str = "go run ./cmd/main.go";
pub const SHELL: &str = "sh";

pub const CONFIG_PATH: &str = "CONFIG_PATH";

pub struct StdIoConf {
    pub stdin: Stdio,
    pub stderr: Stdio,
    pub stdout: Stdio,
}

/// How the child's standard streams are wired up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StdioMode {
    /// stdout and stderr are kept away from the terminal, piped back to a kept `Child` and sent to
    ///   /dev/null for a detached one
    Captured,
    /// stdin, stdout and stderr are the launcher's own
    Inherit,
}

impl StdioMode {
    pub const VARIANTS: &'static [&'static str] = &["captured", "inherit"];

    pub fn stdio_conf(self) -> StdIoConf {
        match self {
            StdioMode::Captured => StdIoConf {
                // nothing is ever written to the child
                stdin: Stdio::null(),
                stderr: Stdio::piped(),
                stdout: Stdio::piped(),
            },
            StdioMode::Inherit => Self::inherit_conf(),
        }
    }

    /// Stdio for a child whose handle is dropped right away, nothing may be left reading a pipe
    pub fn detached_conf(self) -> StdIoConf {
        match self {
            StdioMode::Captured => StdIoConf {
                stdin: Stdio::null(),
                stderr: Stdio::null(),
                stdout: Stdio::null(),
            },
            StdioMode::Inherit => Self::inherit_conf(),
        }
    }

    fn inherit_conf() -> StdIoConf {
        StdIoConf {
            stdin: Stdio::inherit(),
            stderr: Stdio::inherit(),
            stdout: Stdio::inherit(),
        }
    }
}

impl FromStr for StdioMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "captured" => Ok(StdioMode::Captured),
            "inherit" => Ok(StdioMode::Inherit),
            other => Err(format!("unknown stdio mode: {}", other).into()),
        }
    }
}

/// Names used for the channel and token variables in the child's environment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvStyle {
    /// `CHANNEL_ID` and `ACCESS_TOKEN`
    Generic,
    /// `SLACK_CHANNEL` and `SLACK_TOKEN`
    Slack,
}

impl EnvStyle {
    pub const VARIANTS: &'static [&'static str] = &["generic", "slack"];

    pub fn channel_var(self) -> &'static str {
        match self {
            EnvStyle::Generic => "CHANNEL_ID",
            EnvStyle::Slack => "SLACK_CHANNEL",
        }
    }

    pub fn token_var(self) -> &'static str {
        match self {
            EnvStyle::Generic => "ACCESS_TOKEN",
            EnvStyle::Slack => "SLACK_TOKEN",
        }
    }
}

impl Default for EnvStyle {
    fn default() -> Self {
        EnvStyle::Generic
    }
}

impl FromStr for EnvStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "generic" => Ok(EnvStyle::Generic),
            "slack" => Ok(EnvStyle::Slack),
            other => Err(format!("unknown env style: {}", other).into()),
        }
    }
}

/// The variables layered over the inherited environment, values are passed through verbatim
pub fn child_env(config: &LaunchConfig, style: EnvStyle) -> Vec<(String, String)> {
    vec![
        (style.channel_var().to_string(), config.channel.clone()),
        (style.token_var().to_string(), config.token.clone()),
        (
            CONFIG_PATH.to_string(),
            config.config_path.to_string_lossy().into_owned(),
        ),
    ]
}

/// Starts the monitor with the environment derived from a `LaunchConfig`
#[derive(Clone, Debug)]
pub struct Launcher {
    command: String,
    stdio: StdioMode,
    env_style: EnvStyle,
}

impl Launcher {
    pub fn new(stdio: StdioMode) -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            stdio,
            env_style: EnvStyle::default(),
        }
    }

    /// Replace the command line handed to `sh -c`
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn env_style(mut self, env_style: EnvStyle) -> Self {
        self.env_style = env_style;
        self
    }

    pub fn stdio(&self) -> StdioMode {
        self.stdio
    }

    /// Spawn the child and return as soon as the OS has accepted it.
    ///
    /// Nothing about the child is observed after this point, if the command itself fails that is only
    ///   visible in the child's own output. An error is only returned if the shell could not be started.
    ///
    /// The existence check on `config.config_path` is advisory only, a missing file is logged and the
    ///   child is started anyway.
    ///
    /// In `Captured` mode the returned `Child` owns the read ends of stdout and stderr, it must be kept
    ///   and drained (see [`Child::wait`]). Use [`Self::launch_detached`] when the handle is dropped.
    pub fn launch(&self, config: &LaunchConfig) -> Result<Child, Error> {
        self.spawn(config, self.stdio.stdio_conf())
    }

    /// Like `launch`, but the child holds no pipes back to this process
    ///
    /// Captured output goes to /dev/null, so the child keeps running and writing after the handle and
    ///   this process are gone.
    pub fn launch_detached(&self, config: &LaunchConfig) -> Result<Child, Error> {
        self.spawn(config, self.stdio.detached_conf())
    }

    fn spawn(&self, config: &LaunchConfig, stdio: StdIoConf) -> Result<Child, Error> {
        if !config.config_path.is_file() {
            warn!(
                config_path = %config.config_path.display(),
                "checks config not found, the child will likely fail"
            );
        }

        // the parent's environment is inherited, these take precedence
        let child = Command::new(SHELL)
            .arg("-c")
            .arg(&self.command)
            .envs(child_env(config, self.env_style))
            .kill_on_drop(false)
            .stdin(stdio.stdin)
            .stdout(stdio.stdout)
            .stderr(stdio.stderr)
            .spawn()?;

        let pid = child.id();
        info!(
            pid = ?pid,
            command = %self.command,
            channel = %config.channel,
            stdio = ?self.stdio,
            "started child process"
        );

        Ok(Child { child, pid })
    }
}

/// Handle to a started child process
///
/// Dropping it does not stop the process. If stdout or stderr are still captured, dropping closes their
///   read ends and the child gets a broken pipe on its next write.
#[derive(Debug)]
pub struct Child {
    child: tokio::process::Child,
    pid: Option<u32>,
}

impl Child {
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Await the exit of the child, any still captured output is read and dropped
    ///
    /// A failure while draining is logged, the exit status is still returned.
    pub async fn wait(mut self) -> Result<ExitStatus, Error> {
        let stdout = self.take_stdout();
        let stderr = self.take_stderr();

        let (status, out, err) =
            future::join3(self.child.wait(), drain(stdout), drain(stderr)).await;
        let status = status?;
        debug!(pid = ?self.pid, %status, "child exited");

        if let Err(e) = out.and(err) {
            warn!(pid = ?self.pid, "failed to drain child output: {}", e);
        }

        Ok(status)
    }

    /// Like `wait`, but an unsuccessful exit is an error
    pub async fn check_exit(self) -> Result<(), Error> {
        let status = self.wait().await?;

        if status.success() {
            Ok(())
        } else {
            Err(ErrorKind::ChildExit(status).into())
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<u64> {
    match reader {
        Some(mut reader) => {
            let mut sink = tokio::io::sink();
            tokio::io::copy(&mut reader, &mut sink).await
        }
        None => Ok(0),
    }
}
