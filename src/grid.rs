use rand::Rng;

use crate::error::{Error, Result};

/// Cell value reported for points outside the map.
pub const BLOCKED: i32 = -1;

/// Largest accepted side length.
pub const MAX_SIZE: usize = 4096;

/// Square occupancy map. Row-major, 0 = open, anything else is a wall.
pub struct Grid {
    size: usize,
    cells: Vec<u8>,
}

impl Grid {
    pub fn new(size: usize) -> Result<Self> {
        Self::from_fn(size, |_, _| 0)
    }

    /// Builds a grid by asking `fill` for the value of every cell.
    pub fn from_fn(size: usize, mut fill: impl FnMut(usize, usize) -> u8) -> Result<Self> {
        if size == 0 || size > MAX_SIZE {
            return Err(Error::InvalidGridSize(size));
        }
        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                cells.push(fill(x, y));
            }
        }
        Ok(Self { size, cells })
    }

    /// Each cell becomes a wall with probability `wall_probability`, except
    /// `keep_clear` which always stays open.
    pub fn randomize<R: Rng + ?Sized>(
        size: usize,
        wall_probability: f64,
        keep_clear: Option<(usize, usize)>,
        rng: &mut R,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&wall_probability) {
            return Err(Error::InvalidProbability(wall_probability));
        }
        Self::from_fn(size, |x, y| {
            if keep_clear == Some((x, y)) {
                0
            } else {
                u8::from(rng.gen_bool(wall_probability))
            }
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, x: f64, y: f64) -> Option<usize> {
        let (cx, cy) = (x.floor(), y.floor());
        let limit = self.size as f64;
        // NaN fails both comparisons and falls through to None
        if (0.0..limit).contains(&cx) && (0.0..limit).contains(&cy) {
            Some(cy as usize * self.size + cx as usize)
        } else {
            None
        }
    }

    /// Value of the cell containing `(x, y)`, or [`BLOCKED`] off the map.
    #[inline]
    pub fn cell_value(&self, x: f64, y: f64) -> i32 {
        match self.index(x, y) {
            Some(i) => i32::from(self.cells[i]),
            None => BLOCKED,
        }
    }

    /// The map edge counts as a wall.
    #[inline]
    pub fn occupied(&self, x: f64, y: f64) -> bool {
        match self.index(x, y) {
            Some(i) => self.cells[i] > 0,
            None => true,
        }
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c > 0).count()
    }
}
