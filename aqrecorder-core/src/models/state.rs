use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Recorder state machine.
///
/// State transitions:
/// ```text
/// idle → preparing → recording → stopping → idle
///            ↓
///          idle (rollback on any setup failure)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordingState {
    Idle = 0,
    Preparing = 1,
    Recording = 2,
    Stopping = 3,
}

impl RecordingState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Preparing,
            2 => Self::Recording,
            3 => Self::Stopping,
            _ => Self::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Preparing => write!(f, "preparing"),
            Self::Recording => write!(f, "recording"),
            Self::Stopping => write!(f, "stopping"),
        }
    }
}

/// Atomic holder for the recorder state.
///
/// Written only by the control thread; the capture thread reads it to
/// decide whether a completed buffer goes back to the hardware queue.
#[derive(Debug)]
pub struct SharedRecordingState {
    state: AtomicU8,
}

impl SharedRecordingState {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(RecordingState::Idle as u8),
        }
    }

    pub fn current(&self) -> RecordingState {
        RecordingState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_recording(&self) -> bool {
        self.current().is_recording()
    }

    pub fn set(&self, state: RecordingState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to`; returns false if the state was not `from`.
    pub fn transition(&self, from: RecordingState, to: RecordingState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for SharedRecordingState {
    fn default() -> Self {
        Self::new()
    }
}
