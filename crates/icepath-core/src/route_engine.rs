//! Least-cost grid search over the total cost surface.
//!
//! Uniform-cost (Dijkstra) search on the 8-connected cell graph. Entering a
//! cell costs that cell's value scaled by the step length: 1 for cardinal
//! moves, sqrt(2) for diagonal ones.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use crate::error::{Result, RouteError};
use crate::models::{CellCost, CostGrid, GridIndex, PathResult};

/// Neighbour offsets in raster scan order.
const NEIGHBOR_STEPS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Frontier entry. Equal costs pop in raster scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    cost: FloatOrd,
    index: GridIndex,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Least-cost path from `start` to `end`, both inclusive.
pub fn find_path(grid: &CostGrid, start: GridIndex, end: GridIndex) -> Result<PathResult> {
    find_path_bounded(grid, start, end, None)
}

/// As [`find_path`], giving up once `max_expansions` cells have been settled
/// without reaching `end`.
pub fn find_path_bounded(
    grid: &CostGrid,
    start: GridIndex,
    end: GridIndex,
    max_expansions: Option<usize>,
) -> Result<PathResult> {
    check_costs(grid)?;
    let walkable = grid.traversable_count();
    if walkable < 2 {
        return Err(RouteError::InsufficientWalkableCells { walkable });
    }
    check_endpoint(grid, start)?;
    check_endpoint(grid, end)?;

    let total = grid.len();
    let mut best = vec![f64::INFINITY; total];
    let mut came_from: Vec<Option<usize>> = vec![None; total];
    let mut closed = vec![false; total];
    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();

    let start_offset = grid.offset(start);
    let end_offset = grid.offset(end);
    best[start_offset] = 0.0;
    open_set.push(Reverse(OpenNode {
        cost: FloatOrd(0.0),
        index: start,
    }));

    let mut nodes_visited = 0usize;
    let mut reached = false;

    while let Some(Reverse(current)) = open_set.pop() {
        let current_offset = grid.offset(current.index);
        if closed[current_offset] || current.cost.0 > best[current_offset] {
            continue;
        }
        if let Some(limit) = max_expansions {
            if nodes_visited >= limit {
                return Err(RouteError::SearchLimitExceeded(nodes_visited));
            }
        }

        closed[current_offset] = true;
        nodes_visited += 1;

        if current_offset == end_offset {
            reached = true;
            break;
        }

        for (d_row, d_col) in NEIGHBOR_STEPS {
            let Some(next) = neighbor(grid, current.index, d_row, d_col) else {
                continue;
            };
            let next_offset = grid.offset(next);
            if closed[next_offset] {
                continue;
            }
            let Some(CellCost::Finite(cell_cost)) = grid.cells().get(next_offset).copied() else {
                continue;
            };

            let step_len = if d_row != 0 && d_col != 0 { SQRT_2 } else { 1.0 };
            let tentative = best[current_offset] + cell_cost * step_len;
            if tentative < best[next_offset] {
                best[next_offset] = tentative;
                came_from[next_offset] = Some(current_offset);
                open_set.push(Reverse(OpenNode {
                    cost: FloatOrd(tentative),
                    index: next,
                }));
            }
        }
    }

    if !reached {
        tracing::debug!(%start, %end, nodes_visited, "Search exhausted without reaching end");
        return Err(RouteError::NoPath { start, end });
    }

    let mut cells = Vec::new();
    let mut cursor = Some(end_offset);
    while let Some(offset) = cursor {
        cells.push(grid.index_of(offset));
        cursor = came_from[offset];
    }
    cells.reverse();

    let weight = best[end_offset];
    tracing::debug!(
        %start,
        %end,
        weight,
        path_cells = cells.len(),
        nodes_visited,
        "Least-cost path found"
    );

    Ok(PathResult {
        cells,
        weight,
        nodes_visited,
    })
}

fn neighbor(grid: &CostGrid, index: GridIndex, d_row: isize, d_col: isize) -> Option<GridIndex> {
    let row = index.row.checked_add_signed(d_row)?;
    let col = index.col.checked_add_signed(d_col)?;
    let next = GridIndex::new(row, col);
    grid.contains(next).then_some(next)
}

fn check_endpoint(grid: &CostGrid, index: GridIndex) -> Result<()> {
    match grid.get(index) {
        None => Err(RouteError::InvalidEndpoint {
            index,
            reason: format!("outside {}x{} grid", grid.rows(), grid.cols()),
        }),
        Some(CellCost::Impassable) => Err(RouteError::InvalidEndpoint {
            index,
            reason: "cell is impassable".to_string(),
        }),
        Some(CellCost::Finite(_)) => Ok(()),
    }
}

/// Dijkstra needs finite, non-negative edge weights.
fn check_costs(grid: &CostGrid) -> Result<()> {
    for (index, cell) in grid.indexed() {
        if let CellCost::Finite(value) = cell {
            if !value.is_finite() || *value < 0.0 {
                return Err(RouteError::InvalidConfig(format!(
                    "cell {} has unusable cost {}",
                    index, value
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grid;

    fn uniform(rows: usize, cols: usize, cost: f64) -> CostGrid {
        Grid::filled(rows, cols, CellCost::Finite(cost))
    }

    fn idx(row: usize, col: usize) -> GridIndex {
        GridIndex::new(row, col)
    }

    #[test]
    fn start_equal_to_end_is_a_single_cell() {
        let grid = uniform(4, 4, 3.0);
        let result = find_path(&grid, idx(2, 1), idx(2, 1)).unwrap();
        assert_eq!(result.cells, vec![idx(2, 1)]);
        assert_eq!(result.weight, 0.0);
    }

    #[test]
    fn diagonal_steps_cost_sqrt_two_times_cardinal() {
        for cost in [1.0, 5.0] {
            let grid = uniform(3, 3, cost);
            let diagonal = find_path(&grid, idx(0, 0), idx(2, 2)).unwrap();
            let cardinal = find_path(&grid, idx(0, 0), idx(0, 2)).unwrap();
            assert_eq!(diagonal.cells, vec![idx(0, 0), idx(1, 1), idx(2, 2)]);
            assert_eq!(cardinal.cells, vec![idx(0, 0), idx(0, 1), idx(0, 2)]);
            assert!((cardinal.weight - 2.0 * cost).abs() < 1e-9);
            assert!((diagonal.weight / cardinal.weight - SQRT_2).abs() < 1e-9);
        }
    }

    #[test]
    fn weight_counts_destination_cells_only() {
        let grid = Grid::from_vec(
            1,
            3,
            vec![
                CellCost::Finite(100.0),
                CellCost::Finite(2.0),
                CellCost::Finite(3.0),
            ],
        )
        .unwrap();
        let result = find_path(&grid, idx(0, 0), idx(0, 2)).unwrap();
        assert!((result.weight - 5.0).abs() < 1e-12);
    }

    #[test]
    fn detours_around_blocked_cell() {
        let mut grid = uniform(5, 5, 1.0);
        grid.set(idx(2, 2), CellCost::Impassable);
        let result = find_path(&grid, idx(0, 0), idx(4, 4)).unwrap();
        assert_eq!(result.cells.first(), Some(&idx(0, 0)));
        assert_eq!(result.cells.last(), Some(&idx(4, 4)));
        assert!(!result.cells.contains(&idx(2, 2)));
        assert!(result.weight > 4.0 * SQRT_2);
        assert!((result.weight - (3.0 * SQRT_2 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn equal_cost_ties_resolve_in_scan_order() {
        let grid = uniform(3, 3, 1.0);
        let first = find_path(&grid, idx(0, 0), idx(1, 2)).unwrap();
        assert_eq!(first.cells, vec![idx(0, 0), idx(0, 1), idx(1, 2)]);
        for _ in 0..5 {
            assert_eq!(find_path(&grid, idx(0, 0), idx(1, 2)).unwrap(), first);
        }
    }

    #[test]
    fn paths_never_enter_impassable_cells() {
        let mut grid = uniform(8, 8, 1.0);
        for row in 0..7 {
            grid.set(idx(row, 3), CellCost::Impassable);
        }
        for row in 1..8 {
            grid.set(idx(row, 5), CellCost::Impassable);
        }
        let result = find_path(&grid, idx(0, 0), idx(7, 7)).unwrap();
        for cell in &result.cells {
            assert_eq!(grid.get(*cell), Some(&CellCost::Finite(1.0)), "cell {}", cell);
        }
        assert!(result.cells.contains(&idx(7, 3)));
        assert!(result.cells.contains(&idx(0, 5)));
    }

    #[test]
    fn walled_off_end_reports_no_path() {
        let mut grid = uniform(3, 3, 1.0);
        for cell in [idx(0, 1), idx(1, 1), idx(2, 1)] {
            grid.set(cell, CellCost::Impassable);
        }
        let err = find_path(&grid, idx(0, 0), idx(2, 2)).unwrap_err();
        assert_eq!(
            err,
            RouteError::NoPath {
                start: idx(0, 0),
                end: idx(2, 2)
            }
        );
    }

    #[test]
    fn all_impassable_grid_has_insufficient_cells() {
        let grid = Grid::filled(3, 3, CellCost::Impassable);
        assert_eq!(
            find_path(&grid, idx(0, 0), idx(2, 2)).unwrap_err(),
            RouteError::InsufficientWalkableCells { walkable: 0 }
        );

        let mut grid = Grid::filled(2, 2, CellCost::Impassable);
        grid.set(idx(0, 0), CellCost::Finite(1.0));
        assert_eq!(
            find_path(&grid, idx(0, 0), idx(0, 0)).unwrap_err(),
            RouteError::InsufficientWalkableCells { walkable: 1 }
        );
    }

    #[test]
    fn bad_endpoints_are_rejected() {
        let mut grid = uniform(3, 3, 1.0);
        grid.set(idx(1, 1), CellCost::Impassable);
        assert!(matches!(
            find_path(&grid, idx(0, 0), idx(3, 0)),
            Err(RouteError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            find_path(&grid, idx(1, 1), idx(0, 0)),
            Err(RouteError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn expansion_budget_is_enforced() {
        let grid = uniform(20, 20, 1.0);
        assert_eq!(
            find_path_bounded(&grid, idx(0, 0), idx(19, 19), Some(10)).unwrap_err(),
            RouteError::SearchLimitExceeded(10)
        );
        assert!(find_path_bounded(&grid, idx(0, 0), idx(19, 19), Some(400)).is_ok());
    }

    #[test]
    fn negative_costs_are_rejected() {
        let mut grid = uniform(2, 2, 1.0);
        grid.set(idx(0, 1), CellCost::Finite(-1.0));
        assert!(matches!(
            find_path(&grid, idx(0, 0), idx(1, 1)),
            Err(RouteError::InvalidConfig(_))
        ));
    }
}
