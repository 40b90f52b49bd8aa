use crate::labels::Mode;

/// A discrete user request, at most one applied per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select(Mode),
    Quit,
}

/// What applying a [`Command`] did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ModeChanged { from: Mode, to: Mode },
    /// The requested mode was already active; only the status is refreshed
    ModeRefreshed(Mode),
    /// The loop stopped; resources must be released now
    Stopped,
    /// No effect, e.g. any command after stopping
    Ignored,
}

/// Mode and run flag of the interaction loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    mode: Mode,
    running: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Mode::Idle)
    }
}

impl AppState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            running: true,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Apply one command. Stopping is terminal.
    pub fn apply(&mut self, command: Command) -> Transition {
        if !self.running {
            return Transition::Ignored;
        }

        match command {
            Command::Quit => {
                self.running = false;
                Transition::Stopped
            }
            Command::Select(mode) if mode == self.mode => Transition::ModeRefreshed(mode),
            Command::Select(mode) => {
                let from = std::mem::replace(&mut self.mode, mode);
                Transition::ModeChanged { from, to: mode }
            }
        }
    }
}
