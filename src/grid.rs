// grid.rs - Double-buffered cell grid and the B3/S23 rule

use rand::Rng;

/// State of a single cell. Colors only appear at the pixel boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    pub fn from_alive(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }

    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    /// Next state given the number of live Moore neighbors.
    pub fn next(self, neighbors: u8) -> Cell {
        match (self, neighbors) {
            (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive, // Survival
            (Cell::Dead, 3)                     => Cell::Alive, // Birth
            (Cell::Alive, _)                    => Cell::Dead,  // Under/over-population
            (Cell::Dead, _)                     => Cell::Dead,
        }
    }
}

/// Packs RGBA bytes into one pixel value, red in the low byte.
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24
}

/// Packed colors used when a grid is turned into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub alive: u32,
    pub dead: u32,
}

impl Palette {
    pub fn pixel(&self, cell: Cell) -> u32 {
        match cell {
            Cell::Alive => self.alive,
            Cell::Dead => self.dead,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            alive: pack_rgba(255, 255, 255, 255),
            dead: pack_rgba(0, 0, 0, 255),
        }
    }
}

/// A fixed-size automaton with a read buffer and a write buffer.
///
/// `current` is only read during [`Grid::step`] and `next` only written;
/// the two trade places once the step completes. Border cells are never
/// evaluated and keep whatever value they were last given.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    current: Vec<Cell>,
    next: Vec<Cell>,
    palette: Palette,
}

impl Grid {
    /// An all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_palette(width, height, Palette::default())
    }

    pub fn with_palette(width: usize, height: usize, palette: Palette) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            current: vec![Cell::Dead; len],
            next: vec![Cell::Dead; len],
            palette,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Fills both buffers with independent coin flips.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for (cur, next) in self.current.iter_mut().zip(self.next.iter_mut()) {
            let cell = Cell::from_alive(rng.gen_bool(0.5));
            *cur = cell;
            *next = cell;
        }
    }

    /// Kills every cell in both buffers.
    pub fn clear_to_dead(&mut self) {
        self.current.fill(Cell::Dead);
        self.next.fill(Cell::Dead);
    }

    /// Advances one generation.
    pub fn step(&mut self) {
        let w = self.width;
        let h = self.height;
        let old = &self.current;
        let new = &mut self.next;

        for y in 0..h {
            for x in 0..w {
                let pos = x + y * w;
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    new[pos] = old[pos];
                    continue;
                }

                let neighbors = [
                    pos - 1 - w, pos - w, pos + 1 - w,
                    pos - 1,              pos + 1,
                    pos - 1 + w, pos + w, pos + 1 + w,
                ]
                .iter()
                .filter(|&&n| old[n].is_alive())
                .count() as u8;

                new[pos] = old[pos].next(neighbors);
            }
        }

        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Writes `alive` into both buffers at (x, y).
    ///
    /// Returns false, leaving the grid untouched, when the coordinate
    /// falls outside the grid.
    pub fn set_cell(&mut self, x: i32, y: i32, alive: bool) -> bool {
        let Some(pos) = self.index(x, y) else {
            log::trace!("edit at ({x}, {y}) outside {}x{} grid ignored", self.width, self.height);
            return false;
        };
        let cell = Cell::from_alive(alive);
        self.current[pos] = cell;
        self.next[pos] = cell;
        true
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|pos| self.current[pos])
    }

    pub fn population(&self) -> usize {
        self.current.iter().filter(|c| c.is_alive()).count()
    }

    /// Coordinates of every live cell in the current generation, row by row.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let w = self.width;
        self.current
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(move |(pos, _)| (pos % w, pos / w))
    }

    /// Snapshot of the current generation as packed pixels.
    pub fn to_pixels(&self) -> Vec<u32> {
        let mut pixels = vec![0; self.len()];
        self.fill_pixels(&mut pixels);
        pixels
    }

    /// Same as [`Grid::to_pixels`] into a caller-owned buffer.
    pub fn fill_pixels(&self, out: &mut [u32]) {
        debug_assert_eq!(out.len(), self.len());
        for (px, &cell) in out.iter_mut().zip(&self.current) {
            *px = self.palette.pixel(cell);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| x + y * self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn grid_from(width: usize, height: usize, cells: &[(i32, i32)]) -> Grid {
        let mut grid = Grid::new(width, height);
        for &(x, y) in cells {
            assert!(grid.set_cell(x, y, true));
        }
        grid
    }

    #[test]
    fn rule_table() {
        for n in 0..=8u8 {
            let expect_alive = n == 2 || n == 3;
            assert_eq!(Cell::Alive.next(n).is_alive(), expect_alive, "alive with {n}");
            assert_eq!(Cell::Dead.next(n).is_alive(), n == 3, "dead with {n}");
        }
    }

    #[test]
    fn every_neighborhood_of_the_center_cell() {
        // 3x3 grid: one interior cell, the other eight are its neighbors
        for mask in 0u32..512 {
            let mut grid = Grid::new(3, 3);
            for bit in 0..9 {
                if mask & (1 << bit) != 0 {
                    grid.set_cell((bit % 3) as i32, (bit / 3) as i32, true);
                }
            }
            let center = grid.cell(1, 1).unwrap();
            let neighbors = (mask & !(1 << 4)).count_ones() as u8;
            let before = grid.to_pixels();

            grid.step();

            assert_eq!(grid.cell(1, 1).unwrap(), center.next(neighbors), "mask {mask:09b}");
            let after = grid.to_pixels();
            for pos in (0..9).filter(|&p| p != 4) {
                assert_eq!(before[pos], after[pos], "border changed, mask {mask:09b}");
            }
        }
    }

    #[test]
    fn block_is_still_life() {
        let block = [(2, 2), (3, 2), (2, 3), (3, 3)];
        let mut grid = grid_from(6, 6, &block);
        grid.step();
        let live: Vec<_> = grid.live_cells().collect();
        assert_eq!(live, vec![(2, 2), (3, 2), (2, 3), (3, 3)]);
    }

    #[test]
    fn blinker_oscillates() {
        let mut grid = grid_from(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        grid.step();
        let live: Vec<_> = grid.live_cells().collect();
        assert_eq!(live, vec![(2, 1), (2, 2), (2, 3)]);
        grid.step();
        let live: Vec<_> = grid.live_cells().collect();
        assert_eq!(live, vec![(1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn border_cells_are_frozen() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = Grid::new(24, 17);
        grid.randomize(&mut rng);

        let border = |g: &Grid| -> Vec<Cell> {
            let (w, h) = (g.width() as i32, g.height() as i32);
            (0..h)
                .flat_map(|y| (0..w).map(move |x| (x, y)))
                .filter(|&(x, y)| x == 0 || y == 0 || x == w - 1 || y == h - 1)
                .map(|(x, y)| g.cell(x, y).unwrap())
                .collect()
        };

        let before = border(&grid);
        for _ in 0..25 {
            grid.step();
            assert_eq!(border(&grid), before);
        }
    }

    #[test]
    fn lone_border_cell_survives_forever() {
        // would die by the rule, but border cells are never evaluated
        let mut grid = grid_from(5, 5, &[(0, 2)]);
        for _ in 0..3 {
            grid.step();
        }
        assert_eq!(grid.cell(0, 2), Some(Cell::Alive));
    }

    #[test]
    fn clear_to_dead_kills_everything() {
        let mut grid = Grid::new(32, 32);
        grid.randomize(&mut StdRng::seed_from_u64(1));
        assert!(grid.population() > 0);

        grid.clear_to_dead();
        assert_eq!(grid.population(), 0);
        // the write buffer was cleared too
        grid.step();
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn set_cell_rejects_out_of_bounds() {
        let mut grid = Grid::new(4, 3);
        assert!(!grid.set_cell(-1, 0, true));
        assert!(!grid.set_cell(0, -1, true));
        assert!(!grid.set_cell(4, 0, true));
        assert!(!grid.set_cell(0, 3, true));
        assert!(!grid.set_cell(i32::MAX, i32::MAX, true));
        assert_eq!(grid.population(), 0);

        assert!(grid.set_cell(3, 2, true));
        assert_eq!(grid.cell(3, 2), Some(Cell::Alive));
        assert_eq!(grid.cell(4, 2), None);
    }

    #[test]
    fn degenerate_grids_step_without_panicking() {
        for (w, h) in [(0, 0), (1, 1), (2, 5), (5, 2)] {
            let mut grid = Grid::new(w, h);
            grid.randomize(&mut StdRng::seed_from_u64(3));
            let before = grid.to_pixels();
            grid.step();
            assert_eq!(grid.to_pixels(), before, "{w}x{h}");
        }
    }

    #[test]
    fn pixels_follow_palette() {
        let palette = Palette {
            alive: pack_rgba(0, 200, 0, 255),
            dead: pack_rgba(40, 40, 40, 255),
        };
        let mut grid = Grid::with_palette(3, 2, palette);
        grid.set_cell(1, 0, true);
        grid.set_cell(2, 1, true);

        let pixels = grid.to_pixels();
        assert_eq!(
            pixels,
            vec![palette.dead, palette.alive, palette.dead, palette.dead, palette.dead, palette.alive]
        );
    }

    #[test]
    fn pack_rgba_puts_red_in_low_byte() {
        assert_eq!(pack_rgba(0x11, 0x22, 0x33, 0x44), 0x4433_2211);
        assert_eq!(pack_rgba(255, 255, 255, 255).to_le_bytes(), [255; 4]);
    }
}
