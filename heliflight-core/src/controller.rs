use crate::body::KinematicBody;
use crate::config::{FlightTuning, TuningError};
use crate::input::InputSnapshot;
use crate::phase::{Phase, Transition};
use crate::scroll::WorldScroll;
use crate::snapshot::FlightSnapshot;

/// What horizontal input acts on in manual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Steering {
    /// The vehicle keeps its screen x and the background scrolls.
    #[default]
    ScrollWorld,
    /// The vehicle moves across the screen inside the horizontal band.
    MoveVehicle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Timer-driven flight from the origin pad to the target pad. Input is ignored.
    Scripted,
    Manual(Steering),
}

/// Flight phase machine driving a [`KinematicBody`] and the world scroll.
///
/// Each tick runs the rotor update, then the phase's motion and position
/// integration, and only then evaluates that phase's exits in a fixed order.
/// At most one transition happens per tick.
#[derive(Debug, Clone)]
pub struct FlightController {
    body: KinematicBody,
    scroll: WorldScroll,
    phase: Phase,
    time_in_phase: f32,
    mode: ControlMode,
    tuning: FlightTuning,
}

impl FlightController {
    pub fn new(tuning: FlightTuning, mode: ControlMode) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self {
            body: KinematicBody::new(tuning),
            scroll: WorldScroll::new(&tuning.world),
            phase: Phase::Idle,
            time_in_phase: 0.0,
            mode,
            tuning,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_in_phase(&self) -> f32 {
        self.time_in_phase
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn scroll(&self) -> &WorldScroll {
        &self.scroll
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn tuning(&self) -> &FlightTuning {
        &self.tuning
    }

    /// Whether the target pad sits under the vehicle on screen.
    pub fn target_pad_aligned(&self) -> bool {
        let world = &self.tuning.world;
        self.scroll
            .is_aligned(world.target_pad_x, self.body.position.x, world.pad_tolerance)
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// A zero, negative or non-finite `dt` leaves every piece of state
    /// untouched, including the phase timer.
    pub fn tick(&mut self, dt: f32, input: &InputSnapshot) -> Option<Transition> {
        if !(dt.is_finite() && dt > 0.0) {
            if dt != 0.0 {
                log::debug!("ignoring tick with dt {dt}");
            }
            return None;
        }

        self.time_in_phase += dt;
        let next = match self.mode {
            ControlMode::Scripted => self.step_scripted(dt),
            ControlMode::Manual(steering) => self.step_manual(dt, input, steering),
        };
        next.map(|to| self.enter(to))
    }

    /// Back to the origin pad with the rotor stopped, as on construction.
    pub fn reset(&mut self) {
        self.body = KinematicBody::new(self.tuning);
        self.scroll.reset();
        self.phase = Phase::Idle;
        self.time_in_phase = 0.0;
        log::info!("flight reset");
    }

    pub fn snapshot(&self) -> FlightSnapshot {
        let world = &self.tuning.world;
        FlightSnapshot {
            position: self.body.position,
            vertical_velocity: self.body.vertical_velocity(),
            altitude: self.body.altitude(),
            rotor_angle: self.body.rotor_angle(),
            rotor_speed: self.body.rotor_speed(),
            rotor_fraction: self.body.rotor_fraction(),
            can_sustain_lift: self.body.can_sustain_lift(),
            phase: self.phase,
            phase_label: self.phase.label(),
            time_in_phase: self.time_in_phase,
            scroll_offset: self.scroll.offset_x(),
            origin_pad_screen_x: self.scroll.screen_x(world.origin_pad_x),
            target_pad_screen_x: self.scroll.screen_x(world.target_pad_x),
        }
    }

    fn step_scripted(&mut self, dt: f32) -> Option<Phase> {
        match self.phase {
            Phase::Idle => {
                self.body.advance_rotor(dt, false);
                self.settle(dt);
                (self.time_in_phase >= self.tuning.schedule.idle_pause).then_some(Phase::SpinningUp)
            }
            Phase::SpinningUp => {
                self.body.advance_rotor(dt, true);
                self.settle(dt);
                self.body.can_sustain_lift().then_some(Phase::TakeOff)
            }
            Phase::TakeOff => self.climb(dt),
            Phase::Flying => {
                self.body.advance_rotor(dt, true);
                self.body.hold_altitude();
                self.body.integrate_position(dt);
                let gap_before = self.target_pad_gap();
                if self.can_steer() {
                    self.scroll.advance(dt, 1);
                }
                // A long step can carry the pad past the vehicle without ever aligning.
                let crossed = (gap_before < 0.0) != (self.target_pad_gap() < 0.0);

                if self.target_pad_aligned() || crossed {
                    Some(Phase::Landing)
                } else if self.body.is_grounded() {
                    Some(Phase::SpinningDown)
                } else {
                    None
                }
            }
            Phase::Landing => {
                self.body.advance_rotor(dt, true);
                self.body.descend_controlled(dt);
                self.body.integrate_position(dt);
                self.body.is_grounded().then_some(Phase::SpinningDown)
            }
            Phase::SpinningDown => {
                self.body.advance_rotor(dt, false);
                self.settle(dt);
                self.rotor_stopped().then_some(Phase::Done)
            }
            Phase::Done => {
                self.body.advance_rotor(dt, false);
                self.settle(dt);
                None
            }
        }
    }

    fn step_manual(&mut self, dt: f32, input: &InputSnapshot, steering: Steering) -> Option<Phase> {
        match self.phase {
            Phase::Idle => {
                self.body.advance_rotor(dt, false);
                self.settle(dt);
                input.ascend.then_some(Phase::SpinningUp)
            }
            Phase::SpinningUp if input.ascend => {
                self.body.advance_rotor(dt, true);
                let onset = self.tuning.motion.partial_lift_onset * self.tuning.rotor.min_flight_speed;
                if self.body.can_sustain_lift() || self.body.rotor_speed() > onset {
                    self.body.apply_lift(dt);
                }
                self.body.integrate_position(dt);

                (self.body.can_sustain_lift() && self.body.reached_cruise_altitude())
                    .then_some(Phase::Flying)
            }
            Phase::SpinningUp => {
                self.body.advance_rotor(dt, false);
                self.settle(dt);

                (self.body.is_grounded()
                    && self.body.rotor_speed() < self.tuning.rotor.abort_speed)
                    .then_some(Phase::Idle)
            }
            // Manual flights climb out of SpinningUp directly and never enter TakeOff.
            Phase::TakeOff => self.climb(dt),
            Phase::Flying => {
                self.body.advance_rotor(dt, true);
                if input.descend {
                    self.body.descend_controlled(dt);
                } else if input.ascend {
                    self.body.apply_lift(dt);
                } else {
                    self.body.apply_gravity(dt);
                }
                self.body.integrate_position(dt);
                self.steer(dt, input, steering);

                if input.descend {
                    Some(Phase::Landing)
                } else if self.body.is_grounded() {
                    Some(Phase::SpinningDown)
                } else {
                    None
                }
            }
            Phase::Landing => {
                self.body.advance_rotor(dt, true);
                self.body.descend_controlled(dt);
                self.body.integrate_position(dt);
                self.steer(dt, input, steering);

                let grounded = self.body.is_grounded();
                if input.ascend && !grounded {
                    Some(Phase::Flying)
                } else if grounded {
                    Some(Phase::SpinningDown)
                } else {
                    None
                }
            }
            Phase::SpinningDown => {
                self.body.advance_rotor(dt, false);
                self.settle(dt);

                if input.ascend {
                    Some(Phase::SpinningUp)
                } else if self.rotor_stopped() {
                    Some(Phase::Idle)
                } else {
                    None
                }
            }
            Phase::Done => {
                self.body.advance_rotor(dt, false);
                self.settle(dt);
                None
            }
        }
    }

    /// Screen distance from the vehicle to the target pad, positive while the pad is ahead.
    fn target_pad_gap(&self) -> f32 {
        self.scroll.screen_x(self.tuning.world.target_pad_x) - self.body.position.x
    }

    fn can_steer(&self) -> bool {
        self.phase.is_airborne_phase() && !self.body.is_grounded()
    }

    fn steer(&mut self, dt: f32, input: &InputSnapshot, steering: Steering) {
        if !self.can_steer() {
            return;
        }
        let direction = input.horizontal_direction();
        match steering {
            Steering::ScrollWorld => self.scroll.advance(dt, direction),
            Steering::MoveVehicle => self.body.move_horizontal(dt, direction),
        }
    }

    fn climb(&mut self, dt: f32) -> Option<Phase> {
        self.body.advance_rotor(dt, true);
        self.body.apply_lift(dt);
        self.body.integrate_position(dt);
        self.body.reached_cruise_altitude().then_some(Phase::Flying)
    }

    /// Gravity plus integration: keeps a grounded body pinned, lets an airborne one sink.
    fn settle(&mut self, dt: f32) {
        self.body.apply_gravity(dt);
        self.body.integrate_position(dt);
    }

    fn rotor_stopped(&self) -> bool {
        self.body.rotor_speed() < self.tuning.rotor.stop_speed
    }

    fn enter(&mut self, to: Phase) -> Transition {
        let from = self.phase;
        if !from.can_transition_to(to) {
            log::warn!("unexpected flight transition {from} -> {to}");
        }
        debug_assert!(
            from.can_transition_to(to),
            "illegal flight transition {from:?} -> {to:?}"
        );
        self.phase = to;
        self.time_in_phase = 0.0;
        log::info!(
            "flight phase {from} -> {to} (altitude {:.1}px, rotor {:.1} rad/s, scroll {:.1})",
            self.body.altitude(),
            self.body.rotor_speed(),
            self.scroll.offset_x()
        );
        Transition { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn scripted() -> FlightController {
        FlightController::new(FlightTuning::default(), ControlMode::Scripted).unwrap()
    }

    fn manual() -> FlightController {
        FlightController::new(
            FlightTuning::default(),
            ControlMode::Manual(Steering::ScrollWorld),
        )
        .unwrap()
    }

    /// Manual controller cruising `altitude` px above the ground with the rotor at max.
    fn manual_flying(altitude: f32) -> FlightController {
        let mut controller = manual();
        for _ in 0..600 {
            controller.body.advance_rotor(DT, true);
        }
        controller.body.position.y = controller.body.ground_y() - altitude;
        controller.phase = Phase::Flying;
        controller
    }

    fn run_until(
        controller: &mut FlightController,
        input: InputSnapshot,
        max_ticks: usize,
        done: impl Fn(&FlightController) -> bool,
    ) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for _ in 0..max_ticks {
            if done(controller) {
                return transitions;
            }
            transitions.extend(controller.tick(DT, &input));
        }
        assert!(done(controller), "condition not reached in {max_ticks} ticks");
        transitions
    }

    fn run_for(controller: &mut FlightController, input: InputSnapshot, ticks: usize) {
        for _ in 0..ticks {
            controller.tick(DT, &input);
        }
    }

    #[test]
    fn rejects_invalid_tuning() {
        let mut tuning = FlightTuning::default();
        tuning.rotor.min_flight_speed = 30.0;
        assert!(FlightController::new(tuning, ControlMode::Scripted).is_err());
    }

    #[test]
    fn scripted_idle_waits_before_spinning_up() {
        let mut controller = scripted();
        assert_eq!(controller.tick(0.2, &InputSnapshot::NONE), None);
        assert_eq!(controller.tick(0.2, &InputSnapshot::NONE), None);
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.body().rotor_speed(), 0.0);

        let transition = controller.tick(0.2, &InputSnapshot::NONE);
        assert_eq!(
            transition,
            Some(Transition {
                from: Phase::Idle,
                to: Phase::SpinningUp
            })
        );
        assert_eq!(controller.time_in_phase(), 0.0);
    }

    #[test]
    fn scripted_flight_runs_full_lifecycle() {
        let mut controller = scripted();
        let transitions = run_until(&mut controller, InputSnapshot::NONE, 3_000, |c| {
            c.phase() == Phase::Done
        });

        let phases: Vec<Phase> = transitions.iter().map(|t| t.to).collect();
        assert_eq!(
            phases,
            vec![
                Phase::SpinningUp,
                Phase::TakeOff,
                Phase::Flying,
                Phase::Landing,
                Phase::SpinningDown,
                Phase::Done,
            ]
        );
        assert!(controller.target_pad_aligned());
        assert!(controller.body().is_grounded());
        assert_eq!(controller.body().position.y, controller.body().ground_y());
        assert!(controller.body().rotor_speed() < 0.1);
    }

    #[test]
    fn scripted_flight_lands_when_fast_scroll_skips_alignment() {
        let mut tuning = FlightTuning::default();
        tuning.world.scroll_speed = 1_500.0;
        let mut controller = FlightController::new(tuning, ControlMode::Scripted).unwrap();

        let transitions = run_until(&mut controller, InputSnapshot::NONE, 3_000, |c| {
            c.phase() == Phase::Done
        });

        assert!(transitions.iter().any(|t| t.to == Phase::Landing));
        let step = tuning.world.scroll_speed * DT;
        assert!(controller.target_pad_gap().abs() <= step);
    }

    #[test]
    fn long_step_past_the_pad_still_lands() {
        let mut controller = scripted();
        for _ in 0..600 {
            controller.body.advance_rotor(DT, true);
        }
        let cruise = controller.tuning().world.cruise_altitude;
        controller.body.position.y = controller.body.ground_y() - cruise;
        controller.phase = Phase::Flying;
        controller.scroll.advance(6.5, 1);
        assert!(controller.target_pad_gap() > 6.0);

        let transition = controller.tick(0.5, &InputSnapshot::NONE);

        assert_eq!(transition.map(|t| t.to), Some(Phase::Landing));
        assert!(controller.target_pad_gap() < 0.0);
    }

    #[test]
    fn emitted_transitions_follow_the_phase_table() {
        let mut controller = scripted();
        let mut transitions = run_until(&mut controller, InputSnapshot::NONE, 3_000, |c| {
            c.phase() == Phase::Done
        });

        let mut controller = manual();
        transitions.extend(run_until(&mut controller, InputSnapshot::ascend(), 600, |c| {
            c.phase() == Phase::Flying
        }));
        transitions.extend(run_until(&mut controller, InputSnapshot::descend(), 600, |c| {
            c.phase() == Phase::SpinningDown
        }));
        transitions.extend(run_until(&mut controller, InputSnapshot::NONE, 600, |c| {
            c.phase() == Phase::Idle
        }));

        assert!(transitions.len() >= 9);
        for transition in transitions {
            assert!(transition.from.can_transition_to(transition.to), "{transition:?}");
        }
    }

    #[test]
    fn scripted_done_is_terminal() {
        let mut controller = scripted();
        run_until(&mut controller, InputSnapshot::NONE, 3_000, |c| {
            c.phase() == Phase::Done
        });
        for _ in 0..600 {
            assert_eq!(controller.tick(DT, &InputSnapshot::ascend()), None);
        }
        assert_eq!(controller.phase(), Phase::Done);
        assert_eq!(controller.body().rotor_speed(), 0.0);
    }

    #[test]
    fn scripted_mode_ignores_input() {
        let mut controller = scripted();
        run_until(&mut controller, InputSnapshot::NONE, 3_000, |c| {
            c.phase() == Phase::Flying
        });
        let altitude = controller.body().altitude();
        let offset = controller.scroll().offset_x();

        controller.tick(DT, &InputSnapshot::descend().with_left());

        assert_eq!(controller.phase(), Phase::Flying);
        assert_eq!(controller.body().altitude(), altitude);
        assert!(controller.scroll().offset_x() > offset);
    }

    #[test]
    fn manual_flight_lands_and_returns_to_idle() {
        let mut controller = manual();
        let up = run_until(&mut controller, InputSnapshot::ascend(), 600, |c| {
            c.phase() == Phase::Flying
        });
        assert_eq!(up.len(), 2);

        run_for(&mut controller, InputSnapshot::ascend().with_right(), 60);
        assert!(controller.scroll().offset_x() > 0.0);

        let down = run_until(&mut controller, InputSnapshot::descend(), 600, |c| {
            c.phase() == Phase::SpinningDown
        });
        assert_eq!(
            down.iter().map(|t| t.to).collect::<Vec<_>>(),
            vec![Phase::Landing, Phase::SpinningDown]
        );

        run_until(&mut controller, InputSnapshot::NONE, 600, |c| c.phase() == Phase::Idle);
        assert_eq!(controller.body().position.y, controller.body().ground_y());
    }

    #[test]
    fn descend_in_flight_switches_to_fixed_landing_rate() {
        let mut controller = manual_flying(200.0);
        let transition = controller.tick(DT, &InputSnapshot::descend());

        assert_eq!(
            transition,
            Some(Transition {
                from: Phase::Flying,
                to: Phase::Landing
            })
        );
        assert_eq!(controller.body().vertical_velocity(), 100.0);
    }

    #[test]
    fn landing_request_wins_over_ground_contact() {
        let mut controller = manual_flying(0.5);
        let transition = controller.tick(DT, &InputSnapshot::descend());
        assert_eq!(transition.map(|t| t.to), Some(Phase::Landing));

        let transition = controller.tick(DT, &InputSnapshot::NONE);
        assert_eq!(transition.map(|t| t.to), Some(Phase::SpinningDown));
    }

    #[test]
    fn unexpected_ground_contact_spins_down() {
        let mut controller = manual_flying(0.5);
        let transition = controller.tick(DT, &InputSnapshot::NONE);
        assert_eq!(transition.map(|t| t.to), Some(Phase::SpinningDown));
    }

    #[test]
    fn cruise_threshold_triggers_flying_exactly_once() {
        let mut controller = manual_flying(0.0);
        controller.phase = Phase::SpinningUp;
        let cruise = controller.tuning().world.cruise_altitude;
        controller.body.position.y = controller.body.ground_y() - cruise + 1.0;
        assert!(!controller.body().reached_cruise_altitude());

        let mut transitions = Vec::new();
        for _ in 0..30 {
            transitions.extend(controller.tick(DT, &InputSnapshot::ascend()));
        }

        assert_eq!(
            transitions,
            vec![Transition {
                from: Phase::SpinningUp,
                to: Phase::Flying
            }]
        );
        assert!(controller.body().reached_cruise_altitude());
    }

    #[test]
    fn landing_can_be_cancelled_while_airborne() {
        let mut controller = manual_flying(200.0);
        controller.tick(DT, &InputSnapshot::descend());
        assert_eq!(controller.phase(), Phase::Landing);

        let transition = controller.tick(DT, &InputSnapshot::ascend());
        assert_eq!(transition.map(|t| t.to), Some(Phase::Flying));
    }

    #[test]
    fn released_spin_up_falls_back_to_idle() {
        let mut controller = manual();
        run_for(&mut controller, InputSnapshot::ascend(), 30);
        assert_eq!(controller.phase(), Phase::SpinningUp);
        assert!(controller.body().is_grounded());

        let transitions = run_until(&mut controller, InputSnapshot::NONE, 600, |c| {
            c.phase() == Phase::Idle
        });
        assert_eq!(transitions.len(), 1);
        assert!(controller.body().rotor_speed() < 0.5);
    }

    #[test]
    fn spin_down_can_restart() {
        let mut controller = manual_flying(0.5);
        controller.tick(DT, &InputSnapshot::NONE);
        assert_eq!(controller.phase(), Phase::SpinningDown);

        let transition = controller.tick(DT, &InputSnapshot::ascend());
        assert_eq!(transition.map(|t| t.to), Some(Phase::SpinningUp));
    }

    #[test]
    fn grounded_body_stays_pinned() {
        let mut controller = manual_flying(0.5);
        for _ in 0..400 {
            controller.tick(DT, &InputSnapshot::NONE);
            assert_eq!(controller.body().vertical_velocity(), 0.0);
            assert_eq!(controller.body().position.y, controller.body().ground_y());
        }
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn scroll_stops_at_bound_while_still_flying() {
        let mut controller = manual_flying(200.0);
        let input = InputSnapshot::ascend().with_right();
        for _ in 0..1_200 {
            controller.tick(DT, &input);
        }
        let bound = controller.tuning().world.scroll_bounds[1];
        assert_eq!(controller.scroll().offset_x(), bound);

        controller.tick(DT, &input);
        assert_eq!(controller.scroll().offset_x(), bound);
        assert_eq!(controller.phase(), Phase::Flying);
    }

    #[test]
    fn no_scroll_while_grounded() {
        let mut controller = manual();
        for _ in 0..30 {
            controller.tick(DT, &InputSnapshot::NONE.with_right());
        }
        assert_eq!(controller.scroll().offset_x(), 0.0);
    }

    #[test]
    fn ground_phases_ignore_steering_even_when_airborne() {
        let mut controller = manual_flying(200.0);
        controller.phase = Phase::SpinningDown;

        controller.steer(0.5, &InputSnapshot::NONE.with_right(), Steering::ScrollWorld);
        controller.steer(0.5, &InputSnapshot::NONE.with_left(), Steering::MoveVehicle);

        assert_eq!(controller.scroll().offset_x(), 0.0);
        assert_eq!(controller.body().position.x, controller.tuning().world.start_x);
    }

    #[test]
    fn free_steering_moves_vehicle_instead_of_world() {
        let mut controller = FlightController::new(
            FlightTuning::default(),
            ControlMode::Manual(Steering::MoveVehicle),
        )
        .unwrap();
        for _ in 0..600 {
            controller.body.advance_rotor(DT, true);
        }
        controller.body.position.y -= 200.0;
        controller.phase = Phase::Flying;
        let start_x = controller.body().position.x;

        controller.tick(0.1, &InputSnapshot::ascend().with_left());

        assert!((controller.body().position.x - (start_x - 22.0)).abs() < 1e-3);
        assert_eq!(controller.scroll().offset_x(), 0.0);
    }

    #[test]
    fn non_positive_dt_is_a_no_op() {
        let mut controller = manual();
        controller.tick(0.5, &InputSnapshot::ascend());
        let before = controller.snapshot();

        assert_eq!(controller.tick(0.0, &InputSnapshot::ascend()), None);
        assert_eq!(controller.tick(-1.0, &InputSnapshot::ascend()), None);
        assert_eq!(controller.tick(f32::NAN, &InputSnapshot::ascend()), None);

        assert_eq!(controller.snapshot(), before);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut controller = scripted();
        run_until(&mut controller, InputSnapshot::NONE, 3_000, |c| {
            c.phase() == Phase::Landing
        });
        controller.reset();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.rotor_speed, 0.0);
        assert_eq!(snapshot.scroll_offset, 0.0);
        assert_eq!(snapshot.altitude, 0.0);
        assert_eq!(snapshot.target_pad_screen_x, 1500.0);
    }
}
