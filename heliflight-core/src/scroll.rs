use crate::config::WorldLayout;

/// Background offset: `screen_x = world_x - offset_x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldScroll {
    offset_x: f32,
    speed: f32,
    bounds: [f32; 2],
}

impl WorldScroll {
    pub fn new(layout: &WorldLayout) -> Self {
        Self {
            offset_x: 0.0,
            speed: layout.scroll_speed,
            bounds: layout.scroll_bounds,
        }
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn advance(&mut self, dt: f32, direction: i8) {
        if direction == 0 {
            return;
        }
        let step = f32::from(direction.signum()) * self.speed * dt;
        self.offset_x = (self.offset_x + step).clamp(self.bounds[0], self.bounds[1]);
    }

    pub fn screen_x(&self, world_x: f32) -> f32 {
        world_x - self.offset_x
    }

    pub fn is_aligned(&self, world_x: f32, vehicle_screen_x: f32, tolerance: f32) -> bool {
        (self.screen_x(world_x) - vehicle_screen_x).abs() < tolerance
    }

    pub fn reset(&mut self) {
        self.offset_x = 0.0;
    }
}
