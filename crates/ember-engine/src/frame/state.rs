use std::fmt;

/// Frame loop state.
///
/// `Running <-> Paused` follow presentability and occlusion. `Lost` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Frames are rendered and presented.
    Running,
    /// Zero-sized or occluded; nothing is drawn and the loop sleeps briefly.
    Paused,
    /// The device is gone or presentation failed for good.
    Lost,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Running => "running",
            LoopState::Paused => "paused",
            LoopState::Lost => "lost",
        };
        f.write_str(name)
    }
}

/// What the caller should do after a tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickOutcome {
    Continue,
    /// A quit event was received; shut down.
    Exit,
}

/// Moves `state` to `next`, logging real transitions. `Lost` never changes.
pub(super) fn transition(state: &mut LoopState, next: LoopState) {
    if *state == next || *state == LoopState::Lost {
        return;
    }
    match next {
        LoopState::Lost => log::error!("frame loop: {state} -> {next}"),
        _ => log::info!("frame loop: {state} -> {next}"),
    }
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_is_terminal() {
        let mut state = LoopState::Running;
        transition(&mut state, LoopState::Lost);
        transition(&mut state, LoopState::Running);
        assert_eq!(state, LoopState::Lost);
    }

    #[test]
    fn running_and_paused_alternate() {
        let mut state = LoopState::Paused;
        transition(&mut state, LoopState::Running);
        assert_eq!(state, LoopState::Running);
        transition(&mut state, LoopState::Paused);
        assert_eq!(state, LoopState::Paused);
    }
}
