use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    SpinningUp,
    TakeOff,
    Flying,
    Landing,
    SpinningDown,
    Done,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Idle,
        Phase::SpinningUp,
        Phase::TakeOff,
        Phase::Flying,
        Phase::Landing,
        Phase::SpinningDown,
        Phase::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::SpinningUp => "SPINNING UP",
            Phase::TakeOff => "TAKE OFF",
            Phase::Flying => "FLYING",
            Phase::Landing => "LANDING",
            Phase::SpinningDown => "SPIN DOWN",
            Phase::Done => "DONE",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done)
    }

    /// Phases in which the vehicle is meant to be off the ground.
    pub fn is_airborne_phase(self) -> bool {
        matches!(self, Phase::TakeOff | Phase::Flying | Phase::Landing)
    }

    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        match self {
            Idle => matches!(next, SpinningUp),
            SpinningUp => matches!(next, TakeOff | Flying | Idle),
            TakeOff => matches!(next, Flying),
            Flying => matches!(next, Landing | SpinningDown),
            Landing => matches!(next, Flying | SpinningDown),
            SpinningDown => matches!(next, SpinningUp | Idle | Done),
            Done => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}
