use std::sync::{Arc, Mutex};

use crate::Position;

/// Everything the engine tells its host. Within a single `feed` the events
/// are ordered by the character offset that triggered them; exactly one
/// `DisplayChanged` is emitted per `feed`, at the end.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalEvent {
    /// Bytes to forward to the child process (DA/DSR replies, pastes,
    /// scripted input).
    Write(Vec<u8>),
    CursorMoved(Position),
    DisplayChanged,
    /// (rows, cols)
    SizeChanged(i32, i32),
    VisualBell,
    WindowTitleChanged(String),
    WorkingDirectoryChanged(String),
    SelectionChanged,
    SelectionFinished,
    /// `true` when the view snapped back to the live screen.
    ScrollbackAdjusted(bool),
    Hangup,
}

/// Host-provided callback target for [`TerminalEvent`]s.
pub trait EventSink {
    fn on_event(&mut self, event: TerminalEvent);
}

/// Collecting sink, handy in tests and simple hosts.
impl EventSink for Arc<Mutex<Vec<TerminalEvent>>> {
    fn on_event(&mut self, event: TerminalEvent) {
        self.lock().unwrap().push(event);
    }
}
