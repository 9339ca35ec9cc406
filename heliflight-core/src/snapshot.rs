use crate::body::Position;
use crate::phase::Phase;
use serde::Serialize;

/// Per-tick state the renderer and HUD read back from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightSnapshot {
    pub position: Position,
    pub vertical_velocity: f32,
    pub altitude: f32,
    pub rotor_angle: f32,
    pub rotor_speed: f32,
    pub rotor_fraction: f32,
    pub can_sustain_lift: bool,
    pub phase: Phase,
    pub phase_label: &'static str,
    pub time_in_phase: f32,
    pub scroll_offset: f32,
    pub origin_pad_screen_x: f32,
    pub target_pad_screen_x: f32,
}

impl FlightSnapshot {
    /// Rotor gauge value in whole percent.
    pub fn rotor_percent(&self) -> u32 {
        (self.rotor_fraction.clamp(0.0, 1.0) * 100.0) as u32
    }

    pub fn hud_lines(&self) -> [String; 3] {
        [
            format!("State: {}", self.phase_label),
            format!("Rotor: {}%", self.rotor_percent()),
            format!("Altitude: {}px", self.altitude as i32),
        ]
    }
}
