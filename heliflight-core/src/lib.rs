pub mod body;
pub mod config;
pub mod controller;
pub mod input;
pub mod phase;
pub mod scroll;
pub mod snapshot;

pub use body::{KinematicBody, Position};
pub use config::{FlightTuning, MotionTuning, RotorTuning, ScheduleTuning, TuningError, WorldLayout};
pub use controller::{ControlMode, FlightController, Steering};
pub use input::InputSnapshot;
pub use phase::{Phase, Transition};
pub use scroll::WorldScroll;
pub use snapshot::FlightSnapshot;
