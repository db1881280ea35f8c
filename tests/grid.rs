use std::collections::HashSet;

use life_canvas::{Cell, Grid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn grid_from(width: usize, height: usize, cells: &[(i32, i32)]) -> Grid {
    let mut grid = Grid::new(width, height);
    for &(x, y) in cells {
        grid.set_cell(x, y, true);
    }
    grid
}

fn collect_live(grid: &Grid) -> HashSet<(i32, i32)> {
    grid.live_cells().map(|(x, y)| (x as i32, y as i32)).collect()
}

/// Reference stepper over a fixed-size board whose border never changes.
fn step_naive(cells: &HashSet<(i32, i32)>, width: i32, height: i32) -> HashSet<(i32, i32)> {
    let mut next = HashSet::new();
    for y in 0..height {
        for x in 0..width {
            let alive = cells.contains(&(x, y));
            let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
            let next_alive = if border {
                alive
            } else {
                let mut neighbors = 0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if (dx, dy) != (0, 0) && cells.contains(&(x + dx, y + dy)) {
                            neighbors += 1;
                        }
                    }
                }
                if alive { neighbors == 2 || neighbors == 3 } else { neighbors == 3 }
            };
            if next_alive {
                next.insert((x, y));
            }
        }
    }
    next
}

#[test]
fn glider_moves_one_phase() {
    let seed = [(2, 1), (3, 2), (1, 3), (2, 3), (3, 3)];
    let mut grid = grid_from(10, 10, &seed);
    grid.step();

    // (2,1) and (1,3) starve; (1,2) and (2,4) are born
    let expected: HashSet<_> = [(3, 2), (2, 3), (3, 3), (1, 2), (2, 4)].into_iter().collect();
    assert_eq!(collect_live(&grid), expected);
    assert_eq!(expected, step_naive(&seed.into_iter().collect(), 10, 10));
}

#[test]
fn glider_returns_to_shape_after_four_generations() {
    let seed = [(2, 1), (3, 2), (1, 3), (2, 3), (3, 3)];
    let mut grid = grid_from(12, 12, &seed);
    for _ in 0..4 {
        grid.step();
    }
    let shifted: HashSet<_> = seed.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
    assert_eq!(collect_live(&grid), shifted);
}

#[test]
fn matches_reference_on_random_soups() {
    let mut rng = StdRng::seed_from_u64(0x5EED_1234_ABCD_EF01);
    for _ in 0..8 {
        let (w, h) = (rng.gen_range(3..40), rng.gen_range(3..40));
        let mut grid = Grid::new(w as usize, h as usize);
        grid.randomize(&mut rng);

        let mut reference = collect_live(&grid);
        for generation in 0..20 {
            grid.step();
            reference = step_naive(&reference, w, h);
            assert_eq!(collect_live(&grid), reference, "{w}x{h} generation {generation}");
        }
    }
}

#[test]
fn randomize_is_roughly_half_alive() {
    let mut grid = Grid::new(200, 100);
    grid.randomize(&mut StdRng::seed_from_u64(11));
    let fraction = grid.population() as f64 / grid.len() as f64;
    // 20k cells: one standard deviation is about 0.0035
    assert!((fraction - 0.5).abs() < 0.02, "live fraction {fraction}");
}

#[test]
fn edit_then_step_follows_rule() {
    let mut grid = grid_from(12, 12, &[(4, 4), (6, 5)]);
    assert!(grid.set_cell(5, 5, true));
    assert_eq!(grid.cell(5, 5), Some(Cell::Alive));

    let neighbors = [(4, 4), (5, 4), (6, 4), (4, 5), (6, 5), (4, 6), (5, 6), (6, 6)]
        .iter()
        .filter(|&&(x, y)| grid.cell(x, y) == Some(Cell::Alive))
        .count() as u8;
    grid.step();
    assert_eq!(grid.cell(5, 5), Some(Cell::Alive.next(neighbors)));
    assert_eq!(grid.cell(5, 5), Some(Cell::Alive));
}
