use clap::Parser;
use heliflight_core::{
    ControlMode, FlightController, FlightSnapshot, FlightTuning, InputSnapshot, Phase, Steering,
};
#[cfg(target_arch = "wasm32")]
use macroquad::miniquad;
use macroquad::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use crate::heli::{HeliDrawConfig, draw_helicopter};

mod heli;

pub const SCREEN_WIDTH: i32 = 900;
pub const SCREEN_HEIGHT: i32 = 520;
const FIXED_STEP_SECONDS: f32 = 1.0 / 60.0;
const TUNING_PATH: &str = "heliflight.json";
const PAD_WIDTH: f32 = 80.0;
const PAD_HEIGHT: f32 = 8.0;

const SKY_COLOR: Color = Color::from_rgba(135, 206, 235, 255);
const GROUND_COLOR: Color = Color::from_rgba(60, 120, 60, 255);
const ORIGIN_PAD_COLOR: Color = Color::from_rgba(200, 200, 60, 255);
const TARGET_PAD_COLOR: Color = Color::from_rgba(200, 100, 50, 255);
const TEXT_COLOR: Color = Color::from_rgba(15, 25, 35, 255);
const GAUGE_READY_COLOR: Color = Color::from_rgba(50, 200, 50, 255);
const GAUGE_SPINNING_COLOR: Color = Color::from_rgba(200, 200, 50, 255);

static PENDING_RESET: AtomicBool = AtomicBool::new(false);
static PHASE_CODE: AtomicI32 = AtomicI32::new(0);
static ROTOR_PERCENT: AtomicU32 = AtomicU32::new(0);
static ALTITUDE_PX: AtomicI32 = AtomicI32::new(0);

#[unsafe(no_mangle)]
pub extern "C" fn flight_reset() {
    PENDING_RESET.store(true, Ordering::SeqCst);
}

#[unsafe(no_mangle)]
pub extern "C" fn flight_phase_code() -> i32 {
    PHASE_CODE.load(Ordering::SeqCst)
}

#[unsafe(no_mangle)]
pub extern "C" fn flight_rotor_percent() -> u32 {
    ROTOR_PERCENT.load(Ordering::SeqCst)
}

#[unsafe(no_mangle)]
pub extern "C" fn flight_altitude_px() -> i32 {
    ALTITUDE_PX.load(Ordering::SeqCst)
}

fn take_pending_reset() -> bool {
    PENDING_RESET.swap(false, Ordering::SeqCst)
}

fn phase_code(phase: Phase) -> i32 {
    Phase::ALL
        .iter()
        .position(|candidate| *candidate == phase)
        .map_or(-1, |index| index as i32)
}

fn publish_snapshot(snapshot: &FlightSnapshot) {
    PHASE_CODE.store(phase_code(snapshot.phase), Ordering::SeqCst);
    ROTOR_PERCENT.store(snapshot.rotor_percent(), Ordering::SeqCst);
    ALTITUDE_PX.store(snapshot.altitude as i32, Ordering::SeqCst);
}

/// Startup choices taken from the command line.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "heliflight-web", about = "Helicopter pad-to-pad flight")]
pub struct HostOptions {
    /// Play the timed flight from pad to pad; keyboard input is ignored.
    #[arg(long)]
    pub scripted: bool,
    /// Let A/D move the helicopter instead of scrolling the scenery.
    #[arg(long, conflicts_with = "scripted")]
    pub free_x: bool,
    /// JSON tuning file; defaults are used when it does not exist.
    #[arg(long, value_name = "PATH", default_value = TUNING_PATH)]
    pub tuning: PathBuf,
}

impl HostOptions {
    pub fn mode(&self) -> ControlMode {
        if self.scripted {
            ControlMode::Scripted
        } else if self.free_x {
            ControlMode::Manual(Steering::MoveVehicle)
        } else {
            ControlMode::Manual(Steering::ScrollWorld)
        }
    }
}

/// Maps W/A/S/D (or the arrow keys) to flight input.
pub fn input_from_keys(is_down: impl Fn(KeyCode) -> bool) -> InputSnapshot {
    InputSnapshot {
        ascend: is_down(KeyCode::W) || is_down(KeyCode::Up),
        left: is_down(KeyCode::A) || is_down(KeyCode::Left),
        right: is_down(KeyCode::D) || is_down(KeyCode::Right),
        descend: is_down(KeyCode::S) || is_down(KeyCode::Down),
    }
}

struct GameState {
    controller: FlightController,
    draw_config: HeliDrawConfig,
    input: InputSnapshot,
}

impl GameState {
    fn new(controller: FlightController) -> Self {
        Self {
            controller,
            draw_config: HeliDrawConfig::default(),
            input: InputSnapshot::default(),
        }
    }

    fn poll_input(&mut self) {
        self.input = input_from_keys(is_key_down);
        if is_key_pressed(KeyCode::R) {
            flight_reset();
        }
    }

    fn fixed_update(&mut self) {
        if take_pending_reset() {
            self.controller.reset();
        }
        self.controller.tick(FIXED_STEP_SECONDS, &self.input);
    }

    fn render(&self) {
        let snapshot = self.controller.snapshot();
        publish_snapshot(&snapshot);

        clear_background(SKY_COLOR);
        let ground_top = self.controller.tuning().world.ground_y + self.draw_config.skid_drop;
        draw_rectangle(
            0.0,
            ground_top,
            screen_width(),
            screen_height() - ground_top,
            GROUND_COLOR,
        );
        for (pad_x, color) in [
            (snapshot.origin_pad_screen_x, ORIGIN_PAD_COLOR),
            (snapshot.target_pad_screen_x, TARGET_PAD_COLOR),
        ] {
            draw_rectangle(
                pad_x - PAD_WIDTH * 0.5,
                ground_top - PAD_HEIGHT * 0.5,
                PAD_WIDTH,
                PAD_HEIGHT,
                color,
            );
        }

        draw_helicopter(&snapshot, &self.draw_config);
        self.render_hud(&snapshot);
    }

    fn render_hud(&self, snapshot: &FlightSnapshot) {
        for (row, line) in snapshot.hud_lines().iter().enumerate() {
            draw_text(line, 12.0, 24.0 + row as f32 * 22.0, 22.0, TEXT_COLOR);
        }

        let (bar_x, bar_y, bar_w, bar_h) = (150.0, 34.0, 80.0, 14.0);
        draw_rectangle(bar_x, bar_y, bar_w, bar_h, DARKGRAY);
        let gauge_color = if snapshot.can_sustain_lift {
            GAUGE_READY_COLOR
        } else {
            GAUGE_SPINNING_COLOR
        };
        draw_rectangle(
            bar_x,
            bar_y,
            bar_w * snapshot.rotor_fraction.clamp(0.0, 1.0),
            bar_h,
            gauge_color,
        );
        draw_rectangle_lines(bar_x, bar_y, bar_w, bar_h, 1.0, TEXT_COLOR);

        draw_text(
            help_text(self.controller.mode(), snapshot.phase),
            screen_width() - 360.0,
            24.0,
            20.0,
            TEXT_COLOR,
        );
    }
}

fn help_text(mode: ControlMode, phase: Phase) -> &'static str {
    if phase.is_terminal() {
        return "Flight complete - R to restart";
    }
    match mode {
        ControlMode::Scripted => "R - Restart",
        ControlMode::Manual(_) => "W Ascend  A/D Move  S Land  R Restart",
    }
}

pub fn window_conf() -> Conf {
    Conf {
        window_title: "Heliflight".to_owned(),
        window_width: SCREEN_WIDTH,
        window_height: SCREEN_HEIGHT,
        ..Default::default()
    }
}

pub async fn run(options: HostOptions) {
    install_panic_hook();

    let mode = options.mode();
    let tuning = match FlightTuning::load(&options.tuning) {
        Ok(tuning) => tuning,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };
    let controller = match FlightController::new(tuning, mode) {
        Ok(controller) => controller,
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };
    log::info!("starting heliflight in {mode:?} mode");

    let mut game = GameState::new(controller);
    let mut accumulator = 0.0_f32;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        game.poll_input();

        // Consume real elapsed time in fixed-size simulation steps.
        accumulator += get_frame_time();
        while accumulator >= FIXED_STEP_SECONDS {
            game.fixed_update();
            accumulator -= FIXED_STEP_SECONDS;
        }

        game.render();

        next_frame().await;
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Levels forwarded to the miniquad console on wasm.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn logs_at(level: log::Level) -> bool {
    level <= log::Level::Info
}

#[cfg(target_arch = "wasm32")]
struct MiniquadLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for MiniquadLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        logs_at(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            log::Level::Error | log::Level::Warn => miniquad::error!("{}", record.args()),
            _ => miniquad::info!("{}", record.args()),
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    static LOGGER: MiniquadLogger = MiniquadLogger;
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(log::LevelFilter::Info));
}

#[cfg(target_arch = "wasm32")]
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let msg = info.to_string();
        if let Some(location) = info.location() {
            miniquad::error!("panic at {}:{}: {}", location.file(), location.line(), msg);
        } else {
            miniquad::error!("panic: {}", msg);
        }
    }));
}

#[cfg(not(target_arch = "wasm32"))]
fn install_panic_hook() {}
