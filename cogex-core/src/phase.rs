/// Defines session phases and what each one allows
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn accepts_responses(&self) -> bool;
    fn shows_stimulus(&self) -> bool;
    /// No further events are handled once a terminal phase is reached.
    fn is_terminal(&self) -> bool;

    fn is_awaiting_start(&self) -> bool {
        false
    }
    /// Status line shown instead of a stimulus, if any.
    fn banner(&self) -> Option<&'static str> {
        None
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    AwaitingStart,
    Presenting,
    AwaitingResponse,
    Recorded,
    Persisting,
    Done,
    /// Quit before the log was written.
    Aborted,
}

impl Phase for SessionPhase {
    fn accepts_responses(&self) -> bool {
        matches!(self, Self::AwaitingResponse)
    }

    fn shows_stimulus(&self) -> bool {
        matches!(self, Self::Presenting | Self::AwaitingResponse)
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    fn is_awaiting_start(&self) -> bool {
        matches!(self, Self::AwaitingStart)
    }

    fn banner(&self) -> Option<&'static str> {
        match self {
            Self::Persisting => Some("Saving..."),
            Self::Done => Some("Thank you!"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionPhase::AwaitingStart => "awaiting-start",
            SessionPhase::Presenting => "presenting",
            SessionPhase::AwaitingResponse => "awaiting-response",
            SessionPhase::Recorded => "recorded",
            SessionPhase::Persisting => "persisting",
            SessionPhase::Done => "done",
            SessionPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
