// Taskping client
//
// Headless client for the Taskping notification stream: a reconnecting
// SSE consumer, a durable delivery cursor, and a presenter that renders
// delivered items as terminal effects.

pub mod agent;
pub mod cursor;
pub mod presenter;
pub mod terminal;

// Re-exports for convenience
pub use agent::{ClientConfig, RunOutcome, StreamAgent};
pub use cursor::CursorStore;
pub use presenter::{AlertSink, BadgeSink, Presenter, SoundSink, ToastSink};
pub use terminal::{
    TerminalAlertSink, TerminalBadgeSink, TerminalSoundSink, TerminalToastSink,
};
