// config.rs - Canvas size, seed and colors

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::CanvasError;
use crate::grid::{Grid, Palette};

pub const DEFAULT_WIDTH: usize = 640;
pub const DEFAULT_HEIGHT: usize = 480;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
    /// Fixed seed for the startup soup; entropy when `None`.
    pub seed: Option<u64>,
    pub palette: Palette,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            palette: Palette::default(),
        }
    }
}

impl CanvasConfig {
    /// Defaults overridden by `LIFE_CANVAS_WIDTH`, `LIFE_CANVAS_HEIGHT`
    /// and `LIFE_CANVAS_SEED`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(width) = parse_var(&lookup, "LIFE_CANVAS_WIDTH") {
            config.width = width;
        }
        if let Some(height) = parse_var(&lookup, "LIFE_CANVAS_HEIGHT") {
            config.height = height;
        }
        config.seed = parse_var(&lookup, "LIFE_CANVAS_SEED");
        config
    }

    pub fn validate(&self) -> Result<(), CanvasError> {
        if self.width == 0 || self.height == 0 {
            return Err(CanvasError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// The randomized startup grid.
    pub fn build_grid(&self) -> Result<Grid, CanvasError> {
        self.validate()?;
        let mut grid = Grid::with_palette(self.width, self.height, self.palette);
        grid.randomize(&mut self.rng());
        Ok(grid)
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}
