//! Admissible distance estimation for the sliding-tile puzzle.
//!
//! The searchers guide themselves with `estimate`, the classic Manhattan
//! distance augmented with a linear-conflict penalty. Goal positions are
//! derived from the target board once per solve invocation and passed
//! explicitly to every evaluation; nothing in this module holds state across
//! calls, so concurrent solves can never observe each other's targets.
use crate::engine::Board;

/// Target coordinates for every tile value, derived from a target board.
///
/// Indexed by tile value: `position(v)` is the (row, col) the value `v`
/// occupies in the target. Immutable once built; one instance serves exactly
/// one solve invocation.
#[derive(Clone, Debug)]
pub struct GoalPositions {
    n: usize,
    pos: Vec<(u8, u8)>,
}

impl GoalPositions {
    /// Derives goal positions from a target board.
    ///
    /// # Examples
    /// ```
    /// use npuzzle_solver::engine::Board;
    /// use npuzzle_solver::heuristics::GoalPositions;
    ///
    /// let goals = GoalPositions::from_board(&Board::solved(4));
    /// assert_eq!(goals.position(1), (0, 0));
    /// assert_eq!(goals.position(15), (3, 2));
    /// assert_eq!(goals.position(0), (3, 3));
    /// ```
    pub fn from_board(target: &Board) -> GoalPositions {
        let n = target.n();
        let mut pos = vec![(0u8, 0u8); n * n];
        for (idx, &value) in target.cells().iter().enumerate() {
            pos[value as usize] = ((idx / n) as u8, (idx % n) as u8);
        }
        GoalPositions { n, pos }
    }

    /// The (row, col) the given tile value occupies in the target board.
    pub fn position(&self, value: u8) -> (u8, u8) {
        self.pos[value as usize]
    }

    /// The board dimension the goals were derived for.
    pub fn n(&self) -> usize {
        self.n
    }
}

/// Sum over non-blank tiles of the row and column distance to each tile's
/// goal cell. Admissible: every move changes exactly one tile's distance by
/// exactly one.
pub fn manhattan(board: &Board, goals: &GoalPositions) -> u32 {
    let n = board.n();
    let mut total = 0u32;
    for (idx, &value) in board.cells().iter().enumerate() {
        if value == 0 {
            continue;
        }
        let row = (idx / n) as i32;
        let col = (idx % n) as i32;
        let (goal_row, goal_col) = goals.position(value);
        total += (row - goal_row as i32).unsigned_abs();
        total += (col - goal_col as i32).unsigned_abs();
    }
    total
}

/// Counts linearly conflicting tile pairs.
///
/// Two tiles conflict in a row when that row is the goal row of both, both
/// currently sit in it, and their relative order is reversed versus their
/// goal columns; columns are counted symmetrically. Each conflicting pair
/// forces at least two moves beyond the Manhattan bound, because one of the
/// two tiles has to step out of the line and back to let the other pass.
pub fn linear_conflicts(board: &Board, goals: &GoalPositions) -> u32 {
    let n = board.n();
    let mut conflicts = 0u32;

    // Row conflicts: compare goal columns of same-goal-row tiles.
    for row in 0..n {
        let mut goal_cols: Vec<u8> = Vec::with_capacity(n);
        for col in 0..n {
            let value = board.get(row, col);
            if value == 0 {
                continue;
            }
            let (goal_row, goal_col) = goals.position(value);
            if goal_row as usize == row {
                goal_cols.push(goal_col);
            }
        }
        for i in 0..goal_cols.len() {
            for j in (i + 1)..goal_cols.len() {
                if goal_cols[i] > goal_cols[j] {
                    conflicts += 1;
                }
            }
        }
    }

    // Column conflicts: compare goal rows of same-goal-column tiles.
    for col in 0..n {
        let mut goal_rows: Vec<u8> = Vec::with_capacity(n);
        for row in 0..n {
            let value = board.get(row, col);
            if value == 0 {
                continue;
            }
            let (goal_row, goal_col) = goals.position(value);
            if goal_col as usize == col {
                goal_rows.push(goal_row);
            }
        }
        for i in 0..goal_rows.len() {
            for j in (i + 1)..goal_rows.len() {
                if goal_rows[i] > goal_rows[j] {
                    conflicts += 1;
                }
            }
        }
    }

    conflicts
}

/// The combined admissible estimate used by every search tier:
/// `manhattan + 2 × linear_conflicts`.
///
/// The ×2 weight is part of the solver's contract, not a tunable parameter;
/// changing it changes which paths the searchers prefer and breaks output
/// stability.
pub fn estimate(board: &Board, goals: &GoalPositions) -> u32 {
    manhattan(board, goals) + 2 * linear_conflicts(board, goals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Board;
    use std::collections::HashMap;
    use std::collections::VecDeque;

    #[test]
    fn test_manhattan_zero_on_target() {
        let target = Board::solved(4);
        let goals = GoalPositions::from_board(&target);
        assert_eq!(manhattan(&target, &goals), 0);
        assert_eq!(estimate(&target, &goals), 0);
    }

    #[test]
    fn test_manhattan_single_displaced_tile() {
        // Tile 12 is one row below its goal cell.
        let board =
            Board::from_cells(4, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 0, 13, 14, 15, 12])
                .unwrap();
        let goals = GoalPositions::from_board(&Board::solved(4));
        assert_eq!(manhattan(&board, &goals), 1);
        assert_eq!(linear_conflicts(&board, &goals), 0);
        assert_eq!(estimate(&board, &goals), 1);
    }

    #[test]
    fn test_row_conflict_counted_once_per_pair() {
        // Tiles 2 and 1 both belong to row 0 and appear reversed in it.
        let board = Board::from_cells(3, vec![2, 1, 3, 4, 5, 6, 7, 8, 0]).unwrap();
        let goals = GoalPositions::from_board(&Board::solved(3));
        assert_eq!(linear_conflicts(&board, &goals), 1);
        // Each tile is one column off: manhattan 2, plus the 2-move penalty.
        assert_eq!(estimate(&board, &goals), 4);
    }

    #[test]
    fn test_column_conflict_counted() {
        // Tiles 4 and 1 both belong to column 0 and appear reversed in it.
        let board = Board::from_cells(3, vec![4, 2, 3, 1, 5, 6, 7, 8, 0]).unwrap();
        let goals = GoalPositions::from_board(&Board::solved(3));
        assert_eq!(linear_conflicts(&board, &goals), 1);
        assert_eq!(manhattan(&board, &goals), 2);
        assert_eq!(estimate(&board, &goals), 4);
    }

    #[test]
    fn test_tiles_outside_goal_line_do_not_conflict() {
        // Tiles 5 and 1 swapped across rows: neither sits in its goal row or
        // goal column alongside the other, so no pair conflicts anywhere.
        let board = Board::from_cells(3, vec![5, 2, 3, 4, 1, 6, 7, 8, 0]).unwrap();
        let goals = GoalPositions::from_board(&Board::solved(3));
        assert_eq!(linear_conflicts(&board, &goals), 0);
        assert_eq!(manhattan(&board, &goals), 4);
    }

    #[test]
    fn test_goals_follow_arbitrary_target() {
        // Goal positions come from the target board, not from the canonical
        // layout: against itself any board estimates zero.
        let target =
            Board::from_cells(3, vec![3, 1, 2, 6, 4, 5, 0, 7, 8]).unwrap();
        let goals = GoalPositions::from_board(&target);
        assert_eq!(estimate(&target, &goals), 0);
        assert_eq!(goals.position(3), (0, 0));
        assert_eq!(goals.position(0), (2, 0));
    }

    #[test]
    fn test_estimate_admissible_near_goal() {
        // Exhaustive check: for every 3x3 state within 6 moves of the goal,
        // the estimate never exceeds the true optimal distance (computed by
        // breadth-first search from the goal).
        let target = Board::solved(3);
        let goals = GoalPositions::from_board(&target);

        let mut distance: HashMap<Vec<u8>, u32> = HashMap::new();
        let mut queue = VecDeque::new();
        distance.insert(target.cells().to_vec(), 0);
        queue.push_back(target.clone());

        while let Some(board) = queue.pop_front() {
            let d = distance[board.cells()];
            if d == 6 {
                continue;
            }
            for (next, _) in board.neighbors() {
                if !distance.contains_key(next.cells()) {
                    distance.insert(next.cells().to_vec(), d + 1);
                    queue.push_back(next);
                }
            }
        }

        // 90 distinct states lie within 6 moves of the 3x3 goal.
        assert_eq!(distance.len(), 90);
        for (cells, d) in &distance {
            let board = Board::from_cells(3, cells.clone()).unwrap();
            let h = estimate(&board, &goals);
            assert!(
                h <= *d,
                "inadmissible estimate {} for distance {} at {:?}",
                h,
                d,
                cells
            );
        }
    }
}
