use crate::config::FlightTuning;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Helicopter position and rotor state, advanced by explicit time steps.
///
/// All mutators clamp, so rotor speed stays in `[0, max_speed]`, the rotor
/// angle stays in `[0, TAU)` and `y` stays between the ceiling and the ground.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    pub position: Position,
    vertical_velocity: f32,
    rotor_angle: f32,
    rotor_speed: f32,
    tuning: FlightTuning,
}

impl KinematicBody {
    /// Body resting on the ground at `start_x`, rotor stopped.
    pub fn new(tuning: FlightTuning) -> Self {
        Self {
            position: Position::new(tuning.world.start_x, tuning.world.ground_y),
            vertical_velocity: 0.0,
            rotor_angle: 0.0,
            rotor_speed: 0.0,
            tuning,
        }
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn rotor_angle(&self) -> f32 {
        self.rotor_angle
    }

    pub fn rotor_speed(&self) -> f32 {
        self.rotor_speed
    }

    pub fn ground_y(&self) -> f32 {
        self.tuning.world.ground_y
    }

    pub fn ceiling_y(&self) -> f32 {
        self.tuning.world.ground_y - self.tuning.world.max_altitude
    }

    pub fn altitude(&self) -> f32 {
        self.ground_y() - self.position.y
    }

    pub fn rotor_fraction(&self) -> f32 {
        self.rotor_speed / self.tuning.rotor.max_speed
    }

    pub fn advance_rotor(&mut self, dt: f32, accelerating: bool) {
        let rotor = &self.tuning.rotor;
        self.rotor_speed = if accelerating {
            (self.rotor_speed + rotor.spin_accel * dt).min(rotor.max_speed)
        } else {
            (self.rotor_speed - rotor.spin_decel * dt).max(0.0)
        };
        self.rotor_angle = (self.rotor_angle + self.rotor_speed * dt) % TAU;
    }

    pub fn can_sustain_lift(&self) -> bool {
        self.rotor_speed >= self.tuning.rotor.min_flight_speed
    }

    /// Full climb rate once the rotor can carry the body, otherwise a share of
    /// it proportional to how far the rotor has spun up.
    pub fn apply_lift(&mut self, _dt: f32) {
        let motion = &self.tuning.motion;
        self.vertical_velocity = if self.can_sustain_lift() {
            -motion.ascent_speed
        } else {
            let lift_factor = self.rotor_speed / self.tuning.rotor.min_flight_speed;
            -motion.ascent_speed * lift_factor * motion.partial_lift_factor
        };
    }

    pub fn apply_gravity(&mut self, dt: f32) {
        if self.is_grounded() {
            self.settle();
            return;
        }

        let motion = &self.tuning.motion;
        let cushion = self.rotor_fraction() * motion.gravity * motion.rotor_cushion;
        let effective_gravity = motion.gravity - cushion;
        self.vertical_velocity =
            (self.vertical_velocity + effective_gravity * dt).min(motion.landing_descent_speed);
    }

    pub fn descend_controlled(&mut self, _dt: f32) {
        self.vertical_velocity = self.tuning.motion.landing_descent_speed;
    }

    pub fn hold_altitude(&mut self) {
        self.vertical_velocity = 0.0;
    }

    pub fn integrate_position(&mut self, dt: f32) {
        let next_y = self.position.y + self.vertical_velocity * dt;
        self.position.y = next_y.clamp(self.ceiling_y(), self.ground_y());
        if self.position.y >= self.ground_y() {
            self.settle();
        }
    }

    pub fn move_horizontal(&mut self, dt: f32, direction: i8) {
        let [min_x, max_x] = self.tuning.world.horizontal_band;
        let step = f32::from(direction.signum()) * self.tuning.motion.horizontal_speed * dt;
        self.position.x = (self.position.x + step).clamp(min_x, max_x);
    }

    pub fn is_grounded(&self) -> bool {
        self.position.y >= self.ground_y() - self.tuning.world.ground_epsilon
    }

    pub fn reached_cruise_altitude(&self) -> bool {
        self.position.y <= self.ground_y() - self.tuning.world.cruise_altitude
    }

    fn settle(&mut self) {
        self.position.y = self.ground_y();
        self.vertical_velocity = 0.0;
    }
}
