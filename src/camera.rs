use crate::error::{Error, Result};

/// Screen-space vertical extent of one wall strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedWall {
    pub top: f64,
    pub height: f64,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub height: f64,       // viewport height in pixels
    pub resolution: usize, // rays (columns) per frame
    pub focal_length: f64, // smaller is a wider field of view
    pub range: f64,        // max ray length in cells
    pub light_range: f64,  // distance at which walls fade to black
    spacing: f64,          // pixels per column
}

impl Camera {
    pub fn new(width: usize, height: usize, resolution: usize, focal_length: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidCamera(format!(
                "viewport {width}x{height} has no area"
            )));
        }
        if resolution == 0 {
            return Err(Error::InvalidCamera("resolution must be positive".into()));
        }
        if !(focal_length.is_finite() && focal_length > 0.0) {
            return Err(Error::InvalidCamera(format!(
                "focal length must be positive, got {focal_length}"
            )));
        }

        Ok(Self {
            height: height as f64,
            resolution,
            focal_length,
            range: 14.0,
            light_range: 5.0,
            spacing: width as f64 / resolution as f64,
        })
    }

    pub fn with_range(mut self, range: f64, light_range: f64) -> Self {
        self.range = range;
        self.light_range = light_range;
        self
    }

    /// Horizontal angle of a column relative to the view direction.
    #[inline]
    pub fn column_angle(&self, column: usize) -> f64 {
        let x = column as f64 / self.resolution as f64 - 0.5;
        x.atan2(self.focal_length)
    }

    /// Left pixel and pixel width covered by a column.
    #[inline]
    pub fn column_span(&self, column: usize) -> (f64, f64) {
        ((column as f64 * self.spacing).floor(), self.spacing.ceil())
    }

    #[inline]
    pub fn screen_center_y(&self) -> f64 {
        0.5 * self.height
    }

    /// Projects a wall of `height` cells hit `distance` along a ray that is
    /// `angle` off the view direction. `None` when the wall is not in front.
    pub fn project(&self, height: i32, angle: f64, distance: f64) -> Option<ProjectedWall> {
        // Perpendicular distance keeps walls flat across the viewport
        let z = distance * angle.cos();
        if !(z.is_finite() && z > 0.0) {
            return None;
        }
        let wall_height = self.height * f64::from(height) / z;
        let bottom = self.screen_center_y() * (1.0 + 1.0 / z);
        Some(ProjectedWall {
            top: bottom - wall_height,
            height: wall_height,
        })
    }
}
