// Notification presenter
//
// Translates delivered items into user-visible effects: system alert,
// transient toast, unseen badge, and an alert sound. Effects are
// independent and best-effort; a failing sink is logged and skipped,
// never aborting the other effects or the rest of the batch.

use std::time::Duration;

use taskping_core::NotificationItem;

/// Toast auto-dismiss default
const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(6000);

/// System-level alert (desktop notification)
pub trait AlertSink: Send {
    /// Whether the user previously granted system alerts. Checked at
    /// delivery time; a presenter never triggers a permission prompt.
    fn permission_granted(&self) -> bool;

    fn show(&mut self, item: &NotificationItem) -> anyhow::Result<()>;
}

/// In-page transient toast
pub trait ToastSink: Send {
    fn show(&mut self, item: &NotificationItem, dismiss_after: Duration) -> anyhow::Result<()>;
}

/// Unseen counter surface (window title and icon overlay)
pub trait BadgeSink: Send {
    /// Reflect the unseen count; zero clears the badge.
    fn set_unseen(&mut self, count: u32) -> anyhow::Result<()>;
}

/// Alert sound
pub trait SoundSink: Send {
    fn play(&mut self) -> anyhow::Result<()>;
}

/// Applies the per-item effects and owns the unseen counter.
///
/// The counter only ever moves up on a delivered item and down to zero
/// on `clear_unseen`; nothing else touches it.
pub struct Presenter {
    alerts: Box<dyn AlertSink>,
    toasts: Box<dyn ToastSink>,
    badge: Box<dyn BadgeSink>,
    sound: Box<dyn SoundSink>,
    toast_duration: Duration,
    unseen: u32,
}

impl Presenter {
    pub fn new(
        alerts: Box<dyn AlertSink>,
        toasts: Box<dyn ToastSink>,
        badge: Box<dyn BadgeSink>,
        sound: Box<dyn SoundSink>,
    ) -> Self {
        Self {
            alerts,
            toasts,
            badge,
            sound,
            toast_duration: DEFAULT_TOAST_DURATION,
            unseen: 0,
        }
    }

    pub fn unseen(&self) -> u32 {
        self.unseen
    }

    /// Apply all effects for one delivered item.
    pub fn present(&mut self, item: &NotificationItem) {
        if self.alerts.permission_granted() {
            if let Err(e) = self.alerts.show(item) {
                tracing::debug!(error = %e, "Alert sink failed");
            }
        }

        if let Err(e) = self.toasts.show(item, self.toast_duration) {
            tracing::debug!(error = %e, "Toast sink failed");
        }

        self.unseen += 1;
        if let Err(e) = self.badge.set_unseen(self.unseen) {
            tracing::debug!(error = %e, "Badge sink failed");
        }

        if let Err(e) = self.sound.play() {
            tracing::debug!(error = %e, "Sound sink failed");
        }
    }

    /// One-way reset when the user comes back to the window.
    pub fn clear_unseen(&mut self) {
        if self.unseen == 0 {
            return;
        }

        self.unseen = 0;
        if let Err(e) = self.badge.set_unseen(0) {
            tracing::debug!(error = %e, "Badge sink failed");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};

    /// Everything the sinks observed, shared with the test body.
    #[derive(Debug, Default)]
    pub(crate) struct Recorded {
        pub alerts: Vec<String>,
        pub toasts: Vec<(String, Duration)>,
        pub badge_counts: Vec<u32>,
        pub sound_plays: u32,
    }

    pub(crate) struct RecordingAlertSink {
        pub granted: bool,
        pub recorded: Arc<Mutex<Recorded>>,
    }

    impl AlertSink for RecordingAlertSink {
        fn permission_granted(&self) -> bool {
            self.granted
        }

        fn show(&mut self, item: &NotificationItem) -> anyhow::Result<()> {
            self.recorded.lock().unwrap().alerts.push(item.title.clone());
            Ok(())
        }
    }

    pub(crate) struct RecordingToastSink {
        pub recorded: Arc<Mutex<Recorded>>,
    }

    impl ToastSink for RecordingToastSink {
        fn show(&mut self, item: &NotificationItem, dismiss_after: Duration) -> anyhow::Result<()> {
            self.recorded
                .lock()
                .unwrap()
                .toasts
                .push((item.body.clone(), dismiss_after));
            Ok(())
        }
    }

    pub(crate) struct RecordingBadgeSink {
        pub recorded: Arc<Mutex<Recorded>>,
    }

    impl BadgeSink for RecordingBadgeSink {
        fn set_unseen(&mut self, count: u32) -> anyhow::Result<()> {
            self.recorded.lock().unwrap().badge_counts.push(count);
            Ok(())
        }
    }

    pub(crate) struct RecordingSoundSink {
        pub recorded: Arc<Mutex<Recorded>>,
        pub fail: bool,
    }

    impl SoundSink for RecordingSoundSink {
        fn play(&mut self) -> anyhow::Result<()> {
            if self.fail {
                return Err(anyhow!("no audio device"));
            }
            self.recorded.lock().unwrap().sound_plays += 1;
            Ok(())
        }
    }

    pub(crate) fn recording_presenter(
        granted: bool,
        sound_fails: bool,
    ) -> (Presenter, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let presenter = Presenter::new(
            Box::new(RecordingAlertSink {
                granted,
                recorded: recorded.clone(),
            }),
            Box::new(RecordingToastSink {
                recorded: recorded.clone(),
            }),
            Box::new(RecordingBadgeSink {
                recorded: recorded.clone(),
            }),
            Box::new(RecordingSoundSink {
                recorded: recorded.clone(),
                fail: sound_fails,
            }),
        );
        (presenter, recorded)
    }

    fn item(id: i64, title: &str) -> NotificationItem {
        NotificationItem {
            id,
            title: title.to_string(),
            body: format!("body of {}", title),
            url: "/tasks/1".to_string(),
            date: 1_700_000_000,
        }
    }

    #[test]
    fn test_all_effects_fire_per_item() {
        let (mut presenter, recorded) = recording_presenter(true, false);

        presenter.present(&item(1, "First"));
        presenter.present(&item(2, "Second"));

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.alerts, vec!["First", "Second"]);
        assert_eq!(recorded.toasts.len(), 2);
        assert_eq!(recorded.toasts[0].1, Duration::from_millis(6000));
        assert_eq!(recorded.badge_counts, vec![1, 2]);
        assert_eq!(recorded.sound_plays, 2);
        drop(recorded);
        assert_eq!(presenter.unseen(), 2);
    }

    #[test]
    fn test_alert_skipped_without_permission() {
        let (mut presenter, recorded) = recording_presenter(false, false);

        presenter.present(&item(1, "First"));

        let recorded = recorded.lock().unwrap();
        assert!(recorded.alerts.is_empty());
        // The remaining effects are unaffected
        assert_eq!(recorded.toasts.len(), 1);
        assert_eq!(recorded.badge_counts, vec![1]);
        assert_eq!(recorded.sound_plays, 1);
    }

    #[test]
    fn test_sound_failure_is_swallowed() {
        let (mut presenter, recorded) = recording_presenter(true, true);

        presenter.present(&item(1, "First"));
        presenter.present(&item(2, "Second"));

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.sound_plays, 0);
        assert_eq!(recorded.badge_counts, vec![1, 2]);
        assert_eq!(recorded.alerts.len(), 2);
    }

    #[test]
    fn test_clear_unseen_is_one_way_and_idempotent() {
        let (mut presenter, recorded) = recording_presenter(true, false);

        presenter.present(&item(1, "First"));
        presenter.clear_unseen();
        assert_eq!(presenter.unseen(), 0);

        // A second clear with nothing unseen touches nothing.
        presenter.clear_unseen();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.badge_counts, vec![1, 0]);
    }
}
