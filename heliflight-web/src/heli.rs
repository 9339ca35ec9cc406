use heliflight_core::FlightSnapshot;
use macroquad::prelude::*;
use std::f32::consts::PI;

#[derive(Debug, Clone)]
pub struct HeliDrawConfig {
    pub body_width: f32,
    pub body_height: f32,
    pub tail_length: f32,
    pub rotor_length: f32,
    pub rotor_flatten: f32,   // vertical squash of the rotor disc, in px
    pub mast_height: f32,
    pub skid_drop: f32,       // skids sit this far below the body reference point
    pub body_color: Color,
    pub window_color: Color,
    pub outline_color: Color,
    pub rotor_color: Color,
    pub skid_color: Color,
}

impl Default for HeliDrawConfig {
    fn default() -> Self {
        Self {
            body_width: 90.0,
            body_height: 40.0,
            tail_length: 80.0,
            rotor_length: 100.0,
            rotor_flatten: 8.0,
            mast_height: 20.0,
            skid_drop: 10.0,
            body_color: Color::from_rgba(220, 40, 45, 255),
            window_color: Color::from_rgba(180, 220, 230, 255),
            outline_color: Color::from_rgba(50, 50, 50, 255),
            rotor_color: Color::from_rgba(90, 90, 95, 255),
            skid_color: Color::from_rgba(70, 75, 80, 255),
        }
    }
}

/// Rotor tip offsets from the hub for a rotor at `angle`, flattened into a side view.
pub fn rotor_tips(angle: f32, config: &HeliDrawConfig) -> (Vec2, Vec2) {
    let tip = |a: f32| vec2(a.cos() * config.rotor_length, a.sin() * config.rotor_flatten);
    (tip(angle), tip(angle + PI))
}

pub fn draw_helicopter(snapshot: &FlightSnapshot, config: &HeliDrawConfig) {
    let base = vec2(snapshot.position.x, snapshot.position.y);
    let body_top = base.y - config.body_height;
    let body_left = base.x - config.body_width * 0.5;

    // Tail boom and fin behind the fuselage.
    let boom_y = body_top + config.body_height * 0.3;
    draw_rectangle(
        body_left - config.tail_length,
        boom_y,
        config.tail_length,
        config.body_height * 0.25,
        config.body_color,
    );
    draw_rectangle(
        body_left - config.tail_length - 6.0,
        boom_y - 14.0,
        10.0,
        24.0,
        config.body_color,
    );

    draw_rectangle(
        body_left,
        body_top,
        config.body_width,
        config.body_height,
        config.body_color,
    );
    draw_rectangle_lines(
        body_left,
        body_top,
        config.body_width,
        config.body_height,
        2.0,
        config.outline_color,
    );
    draw_rectangle(
        base.x + config.body_width * 0.1,
        body_top + 6.0,
        config.body_width * 0.3,
        config.body_height * 0.5,
        config.window_color,
    );

    let skid_y = base.y + config.skid_drop;
    draw_line(
        body_left - 10.0,
        skid_y,
        body_left + config.body_width + 10.0,
        skid_y,
        4.0,
        config.skid_color,
    );
    for strut_x in [body_left + 15.0, body_left + config.body_width - 15.0] {
        draw_line(strut_x, base.y, strut_x, skid_y, 3.0, config.skid_color);
    }

    let hub = vec2(base.x, body_top - config.mast_height);
    draw_line(hub.x, body_top, hub.x, hub.y, 4.0, config.outline_color);
    let (tip_a, tip_b) = rotor_tips(snapshot.rotor_angle, config);
    draw_line(
        hub.x + tip_a.x,
        hub.y + tip_a.y,
        hub.x + tip_b.x,
        hub.y + tip_b.y,
        6.0,
        config.rotor_color,
    );
    draw_circle(hub.x, hub.y, 5.0, config.rotor_color);
}
