//! Grid ray traversal.
//!
//! A ray is walked from one cell boundary to the next: at every iteration the
//! nearest vertical-line crossing and the nearest horizontal-line crossing are
//! computed, and the shorter one becomes the next [`RayStep`].

use std::f64::consts::SQRT_2;

use crate::grid::Grid;

/// Constant light offset for the wall face a ray crossed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Shading {
    /// Vertical grid line, ray moving towards +x.
    XFace = 0,
    /// Horizontal grid line, ray moving towards +y.
    YFace = 1,
    /// Any grid line crossed while moving towards -x or -y.
    BackFace = 2,
}

impl Shading {
    #[inline]
    pub fn light_offset(self) -> f64 {
        f64::from(self as u8)
    }
}

/// One cell-boundary crossing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayStep {
    pub x: f64,
    pub y: f64,
    /// Value of the cell entered at this boundary, or `grid::BLOCKED`.
    pub height: i32,
    /// Length travelled along the ray, not perpendicular to the view.
    pub distance: f64,
    pub shading: Shading,
    /// Position along the crossed boundary in `[0, 1)`, used as texture U.
    pub offset: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Crossing {
    x: f64,
    y: f64,
    length2: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Picks the closer crossing. The vertical line only wins when strictly
/// shorter, so ties go to the horizontal line.
#[inline]
fn nearer(along_x: Option<Crossing>, along_y: Option<Crossing>) -> Option<(Axis, Crossing)> {
    match (along_x, along_y) {
        (Some(cx), Some(cy)) if cx.length2 < cy.length2 => Some((Axis::X, cx)),
        (Some(cx), None) => Some((Axis::X, cx)),
        (_, Some(cy)) => Some((Axis::Y, cy)),
        (None, None) => None,
    }
}

/// Next integer boundary from `coord` when moving with sign of `run`.
#[inline]
fn next_boundary(coord: f64, run: f64) -> f64 {
    if run > 0.0 {
        (coord + 1.0).floor()
    } else {
        (coord - 1.0).ceil()
    }
}

#[inline]
fn step_x(x: f64, y: f64, sin: f64, cos: f64) -> Option<Crossing> {
    if cos == 0.0 {
        return None;
    }
    let bx = next_boundary(x, cos);
    let dx = bx - x;
    let dy = dx * (sin / cos);
    Some(Crossing {
        x: bx,
        y: y + dy,
        length2: dx * dx + dy * dy,
    })
}

#[inline]
fn step_y(x: f64, y: f64, sin: f64, cos: f64) -> Option<Crossing> {
    if sin == 0.0 {
        return None;
    }
    let by = next_boundary(y, sin);
    let dy = by - y;
    let dx = dy * (cos / sin);
    Some(Crossing {
        x: x + dx,
        y: by,
        length2: dx * dx + dy * dy,
    })
}

#[inline]
fn fraction(v: f64) -> f64 {
    v - v.floor()
}

/// True once the point is off the map and the ray can only move further away.
#[inline]
fn leaves_grid(grid: &Grid, x: f64, y: f64, sin: f64, cos: f64) -> bool {
    let size = grid.size() as f64;
    (x < 0.0 && cos <= 0.0)
        || (x >= size && cos >= 0.0)
        || (y < 0.0 && sin <= 0.0)
        || (y >= size && sin >= 0.0)
}

/// Walks a ray from `origin` along `angle` and returns every boundary crossing.
///
/// The last step is either the first one past `range`, or the one where the
/// ray left the grid for good. Non-finite input gives an empty ray.
pub fn cast(grid: &Grid, origin: [f64; 2], angle: f64, range: f64) -> Vec<RayStep> {
    let mut steps = Vec::new();
    let [mut x, mut y] = origin;
    if !(angle.is_finite() && x.is_finite() && y.is_finite() && range.is_finite() && range >= 0.0)
    {
        return steps;
    }

    let (sin, cos) = angle.sin_cos();
    // A unit of travel crosses at most sqrt(2) grid lines
    let max_steps = (range * SQRT_2).ceil() as usize + 4;
    let mut distance = 0.0;

    while steps.len() < max_steps {
        let (step, sample) = match nearer(step_x(x, y, sin, cos), step_y(x, y, sin, cos)) {
            Some((Axis::X, c)) => inspect_x(grid, c, cos, distance),
            Some((Axis::Y, c)) => inspect_y(grid, c, sin, distance),
            None => break,
        };

        steps.push(step);
        if step.distance > range || leaves_grid(grid, sample[0], sample[1], sin, cos) {
            break;
        }
        x = step.x;
        y = step.y;
        distance = step.distance;
    }

    steps
}

/// Builds the step for a vertical-line crossing. Also returns the sample point.
fn inspect_x(grid: &Grid, c: Crossing, cos: f64, prior: f64) -> (RayStep, [f64; 2]) {
    let nudge = if cos < 0.0 { -0.5 } else { 0.5 };
    let sample = [c.x + nudge, c.y];
    let step = RayStep {
        x: c.x,
        y: c.y,
        height: grid.cell_value(sample[0], sample[1]),
        distance: prior + c.length2.sqrt(),
        shading: if cos < 0.0 {
            Shading::BackFace
        } else {
            Shading::XFace
        },
        offset: fraction(c.y),
    };
    (step, sample)
}

/// Builds the step for a horizontal-line crossing. Also returns the sample point.
fn inspect_y(grid: &Grid, c: Crossing, sin: f64, prior: f64) -> (RayStep, [f64; 2]) {
    let nudge = if sin < 0.0 { -0.5 } else { 0.5 };
    let sample = [c.x, c.y + nudge];
    let step = RayStep {
        x: c.x,
        y: c.y,
        height: grid.cell_value(sample[0], sample[1]),
        distance: prior + c.length2.sqrt(),
        shading: if sin < 0.0 {
            Shading::BackFace
        } else {
            Shading::YFace
        },
        offset: fraction(c.x),
    };
    (step, sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BLOCKED;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn single_wall(size: usize, wx: usize, wy: usize) -> Grid {
        Grid::from_fn(size, |x, y| u8::from(x == wx && y == wy)).unwrap()
    }

    fn first_wall(steps: &[RayStep]) -> Option<&RayStep> {
        steps.iter().find(|s| s.height > 0)
    }

    fn crossing(x: f64, y: f64, length2: f64) -> Option<Crossing> {
        Some(Crossing { x, y, length2 })
    }

    #[test]
    fn test_nearer_tie_goes_to_y() {
        // Ray through a cell corner: both lines are equally far
        let (axis, c) = nearer(crossing(1.0, 0.5, 0.5), crossing(0.5, 1.0, 0.5)).unwrap();
        assert_eq!(axis, Axis::Y);
        assert_eq!((c.x, c.y), (0.5, 1.0));
    }

    #[test]
    fn test_nearer_strictly_shorter_wins() {
        let (axis, c) = nearer(crossing(1.0, 0.2, 0.25), crossing(2.5, 1.0, 0.26)).unwrap();
        assert_eq!(axis, Axis::X);
        assert_eq!(c.x, 1.0);

        let (axis, c) = nearer(crossing(1.0, 0.2, 0.27), crossing(2.5, 1.0, 0.26)).unwrap();
        assert_eq!(axis, Axis::Y);
        assert_eq!(c.y, 1.0);
    }

    #[test]
    fn test_nearer_with_degenerate_axis() {
        let (axis, _) = nearer(crossing(1.0, 0.5, 4.0), None).unwrap();
        assert_eq!(axis, Axis::X);
        let (axis, _) = nearer(None, crossing(0.5, 1.0, 4.0)).unwrap();
        assert_eq!(axis, Axis::Y);
        assert!(nearer(None, None).is_none());
    }

    #[test]
    fn test_axis_aligned_hit() {
        let grid = single_wall(4, 2, 0);
        let steps = cast(&grid, [0.5, 0.5], 0.0, 10.0);

        let hit = first_wall(&steps).expect("wall hit");
        assert_abs_diff_eq!(hit.x, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.y, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.distance, 1.5, epsilon = 1e-9);
        assert_eq!(hit.shading, Shading::XFace);
        assert_abs_diff_eq!(hit.offset, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_steps_before_hit_are_open() {
        let grid = single_wall(4, 2, 0);
        let steps = cast(&grid, [0.5, 0.5], 0.0, 10.0);
        assert_eq!(steps[0].height, 0);
        assert_abs_diff_eq!(steps[0].distance, 0.5, epsilon = 1e-9);
        assert_eq!(steps[1].height, 1);
    }

    #[test]
    fn test_hit_distance_matches_entry_boundary() {
        // Wall cell (3, 1) entered through its x = 3 face
        let grid = single_wall(6, 3, 1);
        let origin = [0.5, 0.5];
        let angle = 0.25f64.atan();
        let steps = cast(&grid, origin, angle, 10.0);

        let hit = first_wall(&steps).expect("wall hit");
        let expected_y = origin[1] + (3.0 - origin[0]) * angle.tan();
        let expected_distance = (3.0 - origin[0]).hypot(expected_y - origin[1]);

        assert_abs_diff_eq!(hit.x, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.y, expected_y, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.distance, expected_distance, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.offset, expected_y - expected_y.floor(), epsilon = 1e-9);
        assert_eq!(hit.shading, Shading::XFace);
    }

    #[test]
    fn test_crossings_alternate_axes_in_distance_order() {
        let grid = Grid::new(8).unwrap();
        let steps = cast(&grid, [0.5, 0.5], 0.25f64.atan(), 20.0);
        assert!(steps.windows(2).all(|w| w[0].distance <= w[1].distance));
        // x = 1, x = 2, then y = 1 at x = 2.5
        assert_abs_diff_eq!(steps[2].y, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(steps[2].x, 2.5, epsilon = 1e-9);
        assert_eq!(steps[2].shading, Shading::YFace);
    }

    #[test]
    fn test_negative_direction_samples_entered_cell() {
        let grid = single_wall(4, 0, 2);
        let steps = cast(&grid, [3.5, 2.5], PI, 10.0);
        let hit = first_wall(&steps).expect("wall hit");
        assert_abs_diff_eq!(hit.x, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.distance, 2.5, epsilon = 1e-9);
        assert_eq!(hit.shading, Shading::BackFace);
    }

    #[test]
    fn test_vertical_ray_uses_y_crossings() {
        let grid = single_wall(4, 1, 3);
        let steps = cast(&grid, [1.25, 0.5], FRAC_PI_2, 10.0);
        let hit = first_wall(&steps).expect("wall hit");
        assert_abs_diff_eq!(hit.y, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.distance, 2.5, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.offset, 0.25, epsilon = 1e-9);
        assert_eq!(hit.shading, Shading::YFace);
    }

    #[test]
    fn test_terminates_at_outer_boundary() {
        let grid = Grid::new(4).unwrap();
        let steps = cast(&grid, [0.5, 0.5], 0.0, 100.0);
        let last = steps.last().unwrap();
        assert_eq!(last.height, BLOCKED);
        assert!(last.distance <= grid.size() as f64 + 1e-9);
        assert!(first_wall(&steps).is_none());
    }

    #[test]
    fn test_diagonal_terminates_inside_range() {
        let grid = Grid::new(16).unwrap();
        for i in 0..64 {
            let angle = i as f64 * PI / 32.0;
            let steps = cast(&grid, [8.3, 7.7], angle, 1000.0);
            let last = steps.last().unwrap();
            assert_eq!(last.height, BLOCKED, "angle {angle}");
            assert!(last.distance < 16.0 * SQRT_2 + 1e-9);
        }
    }

    #[test]
    fn test_range_stops_after_first_step_past_range() {
        let grid = Grid::new(32).unwrap();
        let steps = cast(&grid, [0.5, 0.5], 0.0, 3.0);
        let last = steps.last().unwrap();
        assert!(last.distance > 3.0);
        assert!(steps[..steps.len() - 1].iter().all(|s| s.distance <= 3.0));
        assert_eq!(steps.len(), 4);
    }

    #[test]
    fn test_degenerate_input_gives_empty_ray() {
        let grid = Grid::new(4).unwrap();
        assert!(cast(&grid, [0.5, 0.5], f64::NAN, 10.0).is_empty());
        assert!(cast(&grid, [f64::INFINITY, 0.5], 0.0, 10.0).is_empty());
        assert!(cast(&grid, [0.5, 0.5], 0.0, -1.0).is_empty());
    }

    #[test]
    fn test_outside_origin_facing_away() {
        let grid = Grid::new(4).unwrap();
        let steps = cast(&grid, [2.0, -1.5], -FRAC_PI_2, 10.0);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_outside_origin_can_enter_grid() {
        let grid = single_wall(4, 2, 1);
        let steps = cast(&grid, [2.5, -1.5], FRAC_PI_2, 10.0);
        let hit = first_wall(&steps).expect("wall hit");
        assert_abs_diff_eq!(hit.y, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.distance, 2.5, epsilon = 1e-9);
    }
}
