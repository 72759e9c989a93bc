use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::camera::Camera;
use crate::caster::{RayStep, cast};
use crate::grid::Grid;
use crate::player::Viewer;

/// Opacity of the per-boundary fog pass.
const FOG_ALPHA: f64 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// Backend independent drawing operations, executed in order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Stretch one texture column (picked by `texture_u` in `[0, 1)`) over the rect.
    Blit {
        left: f64,
        width: f64,
        top: f64,
        height: f64,
        texture_u: f64,
    },
    /// Blend a flat color over the rect.
    Fill {
        left: f64,
        width: f64,
        top: f64,
        height: f64,
        color: Rgb,
        alpha: f64,
    },
}

/// Index of the first wall within range, if any.
pub fn first_hit(ray: &[RayStep], range: f64) -> Option<usize> {
    ray.iter()
        .position(|step| step.height > 0 && step.distance <= range)
}

/// Draw commands for one column, farthest step first.
pub fn render_column(
    camera: &Camera,
    column: usize,
    ray: &[RayStep],
    angle: f64,
) -> Vec<DrawCommand> {
    let (left, width) = camera.column_span(column);
    let hit = first_hit(ray, camera.range);
    let mut commands = Vec::with_capacity(ray.len() + 2);

    for (s, step) in ray.iter().enumerate().rev() {
        if hit == Some(s) {
            if let Some(wall) = camera.project(step.height, angle, step.distance) {
                commands.push(DrawCommand::Blit {
                    left,
                    width,
                    top: wall.top,
                    height: wall.height,
                    texture_u: step.offset,
                });
                let shade = (step.distance + step.shading.light_offset()) / camera.light_range;
                commands.push(DrawCommand::Fill {
                    left,
                    width,
                    top: wall.top,
                    height: wall.height,
                    color: Rgb::BLACK,
                    alpha: shade.max(0.0),
                });
            }
        }

        // Repeated once per crossed boundary, so far walls collect more passes
        commands.push(DrawCommand::Fill {
            left,
            width,
            top: 0.0,
            height: camera.height,
            color: Rgb::WHITE,
            alpha: FOG_ALPHA,
        });
    }

    commands
}

/// Casts every column for `viewer` and returns the frame's draw list in column order.
pub fn render(camera: &Camera, viewer: &Viewer, grid: &Grid) -> Vec<DrawCommand> {
    (0..camera.resolution)
        .into_par_iter()
        .flat_map_iter(|column| {
            let angle = camera.column_angle(column);
            let ray = cast(
                grid,
                [viewer.x, viewer.y],
                viewer.direction + angle,
                camera.range,
            );
            render_column(camera, column, &ray, angle)
        })
        .collect()
}
