// Terminal sink implementations
//
// A headless client renders effects with what a terminal gives it:
// printed frames for alerts and toasts, the window-title escape for the
// badge, and the bell for sound.

use std::io::{self, Write};
use std::time::Duration;

use taskping_core::NotificationItem;

use crate::presenter::{AlertSink, BadgeSink, SoundSink, ToastSink};

/// Prints system-alert lines to stderr
pub struct TerminalAlertSink {
    granted: bool,
}

impl TerminalAlertSink {
    pub fn new(granted: bool) -> Self {
        Self { granted }
    }
}

impl AlertSink for TerminalAlertSink {
    fn permission_granted(&self) -> bool {
        self.granted
    }

    fn show(&mut self, item: &NotificationItem) -> anyhow::Result<()> {
        let mut out = io::stderr().lock();
        writeln!(out, "🔔 {}: {}", item.title, item.body)?;
        Ok(())
    }
}

/// Prints toast lines to stderr (nothing to dismiss in a terminal)
#[derive(Default)]
pub struct TerminalToastSink;

impl TerminalToastSink {
    pub fn new() -> Self {
        Self
    }
}

impl ToastSink for TerminalToastSink {
    fn show(&mut self, item: &NotificationItem, _dismiss_after: Duration) -> anyhow::Result<()> {
        let mut out = io::stderr().lock();
        writeln!(out, "  [{}] {}", item.url, item.body)?;
        Ok(())
    }
}

/// Reflects the unseen count in the terminal window title
pub struct TerminalBadgeSink {
    label: String,
}

impl TerminalBadgeSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl BadgeSink for TerminalBadgeSink {
    fn set_unseen(&mut self, count: u32) -> anyhow::Result<()> {
        let mut out = io::stderr().lock();
        if count > 0 {
            write!(out, "\x1b]2;({}) {}\x07", count, self.label)?;
        } else {
            write!(out, "\x1b]2;{}\x07", self.label)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Rings the terminal bell
#[derive(Default)]
pub struct TerminalSoundSink;

impl TerminalSoundSink {
    pub fn new() -> Self {
        Self
    }
}

impl SoundSink for TerminalSoundSink {
    fn play(&mut self) -> anyhow::Result<()> {
        let mut out = io::stderr().lock();
        write!(out, "\x07")?;
        out.flush()?;
        Ok(())
    }
}
