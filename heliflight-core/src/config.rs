use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Rotor spin-up and spin-down behaviour, all in rad/s or rad/s^2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotorTuning {
    pub max_speed: f32,
    pub spin_accel: f32,
    pub spin_decel: f32,
    /// Rotor speed at which full lift is available.
    pub min_flight_speed: f32,
    /// Below this the rotor counts as stopped after a spin-down.
    pub stop_speed: f32,
    /// Below this an abandoned spin-up falls back to idle.
    pub abort_speed: f32,
}

impl Default for RotorTuning {
    fn default() -> Self {
        Self {
            max_speed: 18.0,
            spin_accel: 8.0,
            spin_decel: 4.0,
            min_flight_speed: 12.0,
            stop_speed: 0.1,
            abort_speed: 0.5,
        }
    }
}

/// Vertical and horizontal rates in px/s (gravity in px/s^2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    pub ascent_speed: f32,
    pub landing_descent_speed: f32,
    pub gravity: f32,
    /// Share of gravity cancelled by a rotor spinning at max speed.
    pub rotor_cushion: f32,
    pub partial_lift_factor: f32,
    /// Fraction of `min_flight_speed` above which partial lift kicks in.
    pub partial_lift_onset: f32,
    pub horizontal_speed: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            ascent_speed: 150.0,
            landing_descent_speed: 100.0,
            gravity: 80.0,
            rotor_cushion: 0.8,
            partial_lift_factor: 0.3,
            partial_lift_onset: 0.5,
            horizontal_speed: 220.0,
        }
    }
}

/// Screen and world layout. `y` grows downward from the top of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldLayout {
    pub ground_y: f32,
    pub max_altitude: f32,
    pub cruise_altitude: f32,
    pub ground_epsilon: f32,
    pub start_x: f32,
    pub horizontal_band: [f32; 2],
    pub scroll_speed: f32,
    pub scroll_bounds: [f32; 2],
    pub origin_pad_x: f32,
    pub target_pad_x: f32,
    pub pad_tolerance: f32,
}

impl Default for WorldLayout {
    fn default() -> Self {
        Self {
            ground_y: 390.0,
            max_altitude: 350.0,
            cruise_altitude: 50.0,
            ground_epsilon: 1.0,
            start_x: 315.0,
            horizontal_band: [100.0, 800.0],
            scroll_speed: 180.0,
            scroll_bounds: [-200.0, 2000.0],
            origin_pad_x: 50.0,
            target_pad_x: 1500.0,
            pad_tolerance: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleTuning {
    /// Seconds the scripted flight waits on the pad before spinning up.
    pub idle_pause: f32,
}

impl Default for ScheduleTuning {
    fn default() -> Self {
        Self { idle_pause: 0.5 }
    }
}

/// Immutable tuning handed to the body and controller at construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    pub rotor: RotorTuning,
    pub motion: MotionTuning,
    pub world: WorldLayout,
    pub schedule: ScheduleTuning,
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl TuningError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::invalid(field, "must be finite and positive"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::invalid(field, "must be finite and not negative"))
    }
}

fn ordered(field: &'static str, range: [f32; 2]) -> Result<(), TuningError> {
    if range.iter().all(|v| v.is_finite()) && range[0] < range[1] {
        Ok(())
    } else {
        Err(TuningError::invalid(field, "lower bound must be below upper bound"))
    }
}

impl FlightTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        let rotor = &self.rotor;
        positive("rotor.max_speed", rotor.max_speed)?;
        positive("rotor.spin_accel", rotor.spin_accel)?;
        positive("rotor.spin_decel", rotor.spin_decel)?;
        positive("rotor.min_flight_speed", rotor.min_flight_speed)?;
        if rotor.min_flight_speed > rotor.max_speed {
            return Err(TuningError::invalid(
                "rotor.min_flight_speed",
                "must not exceed rotor.max_speed",
            ));
        }
        non_negative("rotor.stop_speed", rotor.stop_speed)?;
        non_negative("rotor.abort_speed", rotor.abort_speed)?;

        let motion = &self.motion;
        positive("motion.ascent_speed", motion.ascent_speed)?;
        positive("motion.landing_descent_speed", motion.landing_descent_speed)?;
        non_negative("motion.gravity", motion.gravity)?;
        non_negative("motion.rotor_cushion", motion.rotor_cushion)?;
        non_negative("motion.partial_lift_factor", motion.partial_lift_factor)?;
        non_negative("motion.partial_lift_onset", motion.partial_lift_onset)?;
        non_negative("motion.horizontal_speed", motion.horizontal_speed)?;

        let world = &self.world;
        if !world.ground_y.is_finite() {
            return Err(TuningError::invalid("world.ground_y", "must be finite"));
        }
        positive("world.max_altitude", world.max_altitude)?;
        positive("world.cruise_altitude", world.cruise_altitude)?;
        if world.cruise_altitude > world.max_altitude {
            return Err(TuningError::invalid(
                "world.cruise_altitude",
                "must not exceed world.max_altitude",
            ));
        }
        non_negative("world.ground_epsilon", world.ground_epsilon)?;
        ordered("world.horizontal_band", world.horizontal_band)?;
        if !(world.horizontal_band[0]..=world.horizontal_band[1]).contains(&world.start_x) {
            return Err(TuningError::invalid(
                "world.start_x",
                "must lie inside world.horizontal_band",
            ));
        }
        positive("world.scroll_speed", world.scroll_speed)?;
        ordered("world.scroll_bounds", world.scroll_bounds)?;
        let [min_offset, max_offset] = world.scroll_bounds;
        if !(min_offset..=max_offset).contains(&0.0) {
            return Err(TuningError::invalid(
                "world.scroll_bounds",
                "must contain the starting offset 0",
            ));
        }
        if !world.origin_pad_x.is_finite() || !world.target_pad_x.is_finite() {
            return Err(TuningError::invalid("world.target_pad_x", "must be finite"));
        }
        // The scripted flight lands once the pad scrolls under the start position.
        let landing_offset = world.target_pad_x - world.start_x;
        if !(min_offset..=max_offset).contains(&landing_offset) {
            return Err(TuningError::invalid(
                "world.target_pad_x",
                "must be reachable within world.scroll_bounds",
            ));
        }
        positive("world.pad_tolerance", world.pad_tolerance)?;

        non_negative("schedule.idle_pause", self.schedule.idle_pause)?;
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reads tuning from `path`; a missing file means defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let tuning = Self::from_json_str(&text)?;
                log::info!("loaded flight tuning from {}", path.display());
                Ok(tuning)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no tuning at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}
