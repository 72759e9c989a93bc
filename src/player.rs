use std::f64::consts::{PI, TAU};

use crate::grid::Grid;

const WALK_SPEED: f64 = 3.0; // cells/s
const TURN_SPEED: f64 = PI; // rad/s

/// Held movement keys for the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub backward: bool,
}

/// Wraps an angle into `[0, 2pi)`.
#[inline]
fn normalize_angle(a: f64) -> f64 {
    let a = a.rem_euclid(TAU);
    // rem_euclid rounds tiny negatives up to exactly TAU
    if a >= TAU { 0.0 } else { a }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewer {
    pub x: f64,
    pub y: f64,
    pub direction: f64, // radians in [0, 2pi)
}

impl Viewer {
    pub fn new(x: f64, y: f64, direction: f64) -> Self {
        Self {
            x,
            y,
            direction: normalize_angle(direction),
        }
    }

    pub fn rotate(&mut self, angle: f64) {
        self.direction = normalize_angle(self.direction + angle);
    }

    /// Moves along the view direction, sliding along walls: each axis is
    /// checked and applied on its own.
    pub fn walk(&mut self, distance: f64, grid: &Grid) {
        let (sin, cos) = self.direction.sin_cos();
        let dx = cos * distance;
        let dy = sin * distance;
        if !grid.occupied(self.x + dx, self.y) {
            self.x += dx;
        }
        if !grid.occupied(self.x, self.y + dy) {
            self.y += dy;
        }
    }

    pub fn update(&mut self, input: &InputState, grid: &Grid, seconds: f64) {
        if input.left {
            self.rotate(-TURN_SPEED * seconds);
        }
        if input.right {
            self.rotate(TURN_SPEED * seconds);
        }
        if input.forward {
            self.walk(WALK_SPEED * seconds, grid);
        }
        if input.backward {
            self.walk(-WALK_SPEED * seconds, grid);
        }
    }
}
