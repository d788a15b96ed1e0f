//! Deferred-fire capability.
//!
//! A schedule operation returns immediately; something else must wake up at
//! the fire time and re-enter through the `fire` entry point. That something
//! is a [`DeferredExecutor`] backend. Registration is fire-and-forget: no
//! acknowledgement, no cancellation channel. The default backend outlives
//! the registering process but not a host reboot, and that is documented
//! behavior.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{PingmeError, Result};
use crate::reminder::Reminder;

/// Something that can arrange a future fire independent of this process.
pub trait DeferredExecutor {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Arrange for the reminder's fire entry point to run after
    /// `delay_secs`. The registration carries the whole record; backends
    /// decide what they need from it.
    fn register(&self, delay_secs: i64, reminder: &Reminder) -> Result<()>;
}

/// Default backend: a disowned `sh` job that sleeps and then execs the
/// given binary's hidden `fire` subcommand with the record id.
///
/// The job runs in its own process group with stdio detached, so it keeps
/// sleeping after the scheduling process exits. It does not survive reboot.
#[derive(Debug, Clone)]
pub struct DetachedShellExecutor {
    /// Binary to re-enter at fire time, normally the current executable.
    callback_exe: PathBuf,
}

impl DetachedShellExecutor {
    pub fn new(callback_exe: impl Into<PathBuf>) -> Self {
        Self {
            callback_exe: callback_exe.into(),
        }
    }

    fn build_command(&self, delay_secs: i64, id: &str) -> Command {
        // The id and exe path travel as positional parameters, never
        // interpolated into the script text.
        let script = format!("sleep {} && exec \"$0\" fire \"$1\"", delay_secs.max(0));
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(script)
            .arg(&self.callback_exe)
            .arg(id)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }
}

impl DeferredExecutor for DetachedShellExecutor {
    fn name(&self) -> &'static str {
        "detached-shell"
    }

    fn register(&self, delay_secs: i64, reminder: &Reminder) -> Result<()> {
        let mut cmd = self.build_command(delay_secs, &reminder.id);
        cmd.spawn().map_err(|e| {
            PingmeError::Executor(format!("cannot spawn deferred fire job: {e}"))
        })?;
        debug!(
            id = %reminder.id,
            delay_secs,
            backend = self.name(),
            "deferred fire registered"
        );
        Ok(())
    }
}

/// Test double that records registrations instead of arming anything.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    registered: Mutex<Vec<(i64, Reminder)>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `(delay_secs, record)` registrations so far.
    pub fn registered(&self) -> Vec<(i64, Reminder)> {
        self.registered.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl DeferredExecutor for RecordingExecutor {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn register(&self, delay_secs: i64, reminder: &Reminder) -> Result<()> {
        if let Ok(mut registered) = self.registered.lock() {
            registered.push((delay_secs, reminder.clone()));
        }
        Ok(())
    }
}

/// Test double that always refuses to arm.
#[derive(Debug, Default)]
pub struct FailingExecutor;

impl DeferredExecutor for FailingExecutor {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn register(&self, _delay_secs: i64, _reminder: &Reminder) -> Result<()> {
        Err(PingmeError::Executor("backend refused registration".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn sample(id: &str) -> Reminder {
        let now = Local::now();
        Reminder::new(id.to_string(), now, "msg".to_string(), now)
    }

    #[test]
    fn test_shell_command_shape() {
        let exec = DetachedShellExecutor::new("/usr/local/bin/pingme");
        let cmd = exec.build_command(1800, "a1b2c3d4");

        assert_eq!(cmd.get_program().to_string_lossy(), "sh");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(args[0], "-c");
        assert!(args[1].contains("sleep 1800"));
        assert!(args[1].contains("fire"));
        assert_eq!(args[2], "/usr/local/bin/pingme");
        assert_eq!(args[3], "a1b2c3d4");
    }

    #[test]
    fn test_negative_delay_clamps_to_zero() {
        let exec = DetachedShellExecutor::new("pingme");
        let cmd = exec.build_command(-5, "a1b2c3d4");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert!(args[1].contains("sleep 0"));
    }

    #[test]
    fn test_recording_executor_captures_registrations() {
        let exec = RecordingExecutor::new();
        exec.register(60, &sample("aaaa1111")).unwrap();
        exec.register(120, &sample("bbbb2222")).unwrap();

        let registered = exec.registered();
        assert_eq!(registered.len(), 2);
        assert_eq!(registered[0].0, 60);
        assert_eq!(registered[1].1.id, "bbbb2222");
    }

    #[test]
    fn test_failing_executor_errors() {
        let exec = FailingExecutor;
        let err = exec.register(5, &sample("cccc3333")).unwrap_err();
        assert!(matches!(err, PingmeError::Executor(_)));
    }
}
