//! Notification delivery capability.
//!
//! The engine never talks to the desktop directly; it goes through the
//! [`Notifier`] trait so the platform backend can be swapped for a test
//! double. Delivery is fire-and-forget: there is no confirmation channel,
//! and a failed send is reported once, never retried.

use std::process::Command;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{PingmeError, Result};

/// Something that can show the user a notification.
pub trait Notifier {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Deliver a notification. No retry on failure.
    fn notify(&self, title: &str, message: &str) -> Result<()>;
}

/// Platform notifier: `osascript display notification` on macOS,
/// `notify-send` elsewhere.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    sound: String,
}

impl CommandNotifier {
    pub fn new(sound: impl Into<String>) -> Self {
        Self {
            sound: sound.into(),
        }
    }

    fn build_command(&self, title: &str, message: &str) -> Command {
        if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\" sound name \"{}\"",
                applescript_escape(message),
                applescript_escape(title),
                applescript_escape(&self.sound),
            );
            let mut cmd = Command::new("osascript");
            cmd.arg("-e").arg(script);
            cmd
        } else {
            let mut cmd = Command::new("notify-send");
            cmd.arg(title).arg(message);
            cmd
        }
    }
}

impl Notifier for CommandNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn notify(&self, title: &str, message: &str) -> Result<()> {
        let mut cmd = self.build_command(title, message);
        let program = cmd.get_program().to_string_lossy().to_string();

        let output = cmd
            .output()
            .map_err(|e| PingmeError::Notifier(format!("cannot run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PingmeError::Notifier(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        debug!(backend = self.name(), %title, "notification delivered");
        Ok(())
    }
}

/// Escape a string for embedding in a double-quoted AppleScript literal.
fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Test double that records every notification instead of showing it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `(title, message)` pairs delivered so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn notify(&self, title: &str, message: &str) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((title.to_string(), message.to_string()));
        }
        Ok(())
    }
}

/// Test double that always fails delivery.
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn notify(&self, _title: &str, _message: &str) -> Result<()> {
        Err(PingmeError::Notifier("backend rejected delivery".to_string()))
    }
}
