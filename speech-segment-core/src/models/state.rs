/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → recording → stopping → stopped
/// ```
/// `stopped` is terminal; a new session is needed to record again.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Recording { segments_delivered: u64 },
    Stopping,
    Stopped { segments_delivered: u64 },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped { .. })
    }

    pub fn segments_delivered(&self) -> u64 {
        match self {
            Self::Recording { segments_delivered } | Self::Stopped { segments_delivered } => {
                *segments_delivered
            }
            _ => 0,
        }
    }

    /// Lowercase name for logs and event payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording { .. } => "recording",
            Self::Stopping => "stopping",
            Self::Stopped { .. } => "stopped",
        }
    }
}
