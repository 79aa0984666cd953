//! Utility functions: board input parsing and solution presentation.
use crate::engine::{Direction, Move};
use thiserror::Error;

/// Errors raised while parsing board text.
///
/// All variants are user-facing: they describe what is wrong with the typed
/// input, not with the solver's internals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseBoardError {
    /// The comma-separated list has the wrong number of entries.
    #[error("expected {expected} comma-separated values, found {found}")]
    WrongCount { expected: usize, found: usize },

    /// An entry is not a non-negative integer.
    #[error("'{0}' is not a tile number")]
    NotANumber(String),

    /// A tile value appears more than once.
    #[error("tile value {0} appears more than once")]
    Duplicate(u32),

    /// A tile value falls outside `0..n²`.
    #[error("tile value {found} is out of range for a {n}x{n} board")]
    OutOfRange { found: u32, n: usize },
}

/// Parses a comma-separated board description into a flat cell vector.
///
/// The text must contain exactly `n * n` integers that together cover
/// `0..n²` with no duplicates, i.e. a complete permutation with a single
/// blank (0). Whitespace around entries is ignored.
///
/// # Arguments
/// * `text`: The comma-separated values, e.g. `"1,2,3,0"`.
/// * `n`: The board dimension the text must describe.
///
/// # Returns
/// * `Ok(cells)`: row-major cell values ready for
///   `Board::from_cells(n, cells)`.
/// * `Err(ParseBoardError)`: the first problem found, in scan order:
///   entry count, numeric parse, range, duplication.
///
/// # Examples
/// ```
/// use npuzzle_solver::utils::{parse_board_text, ParseBoardError};
///
/// let cells = parse_board_text("3, 1, 2, 0", 2).unwrap();
/// assert_eq!(cells, vec![3, 1, 2, 0]);
///
/// assert_eq!(
///     parse_board_text("1,2,3", 2).unwrap_err(),
///     ParseBoardError::WrongCount { expected: 4, found: 3 }
/// );
/// assert_eq!(
///     parse_board_text("1,2,2,0", 2).unwrap_err(),
///     ParseBoardError::Duplicate(2)
/// );
/// ```
pub fn parse_board_text(text: &str, n: usize) -> Result<Vec<u8>, ParseBoardError> {
    let count = n * n;
    let entries: Vec<&str> = text.split(',').map(str::trim).collect();
    if entries.len() != count {
        return Err(ParseBoardError::WrongCount {
            expected: count,
            found: entries.len(),
        });
    }

    let mut cells = Vec::with_capacity(count);
    let mut seen = vec![false; count];
    for entry in entries {
        let value: u32 = entry
            .parse()
            .map_err(|_| ParseBoardError::NotANumber(entry.to_string()))?;
        if value as usize >= count {
            return Err(ParseBoardError::OutOfRange { found: value, n });
        }
        if seen[value as usize] {
            return Err(ParseBoardError::Duplicate(value));
        }
        seen[value as usize] = true;
        cells.push(value as u8);
    }
    // count entries, all distinct, all below count: exactly 0..n² is covered.
    Ok(cells)
}

/// One presentation row of a solution: the move plus display helpers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolutionStep {
    /// 1-based position in the solution.
    pub step: usize,
    pub tile: u8,
    pub from: (u8, u8),
    pub to: (u8, u8),
    pub direction: Direction,
    /// Ready-to-display summary, e.g. `"Move tile 12 up"`.
    pub description: String,
}

/// Formats a move list into numbered display steps.
///
/// Pure presentation: the search contract is the `Move` list itself, and
/// this conversion never alters it.
///
/// # Examples
/// ```
/// use npuzzle_solver::engine::{Direction, Move};
/// use npuzzle_solver::utils::solution_steps;
///
/// let mv = Move {
///     tile: 12,
///     from: (3, 3),
///     to: (2, 3),
///     direction: Direction::Up,
/// };
/// let steps = solution_steps(&[mv]);
/// assert_eq!(steps[0].step, 1);
/// assert_eq!(steps[0].description, "Move tile 12 up");
/// ```
pub fn solution_steps(moves: &[Move]) -> Vec<SolutionStep> {
    moves
        .iter()
        .enumerate()
        .map(|(i, mv)| SolutionStep {
            step: i + 1,
            tile: mv.tile,
            from: mv.from,
            to: mv.to,
            direction: mv.direction,
            description: format!("Move tile {} {}", mv.tile, mv.direction),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_board() {
        let cells = parse_board_text("1,2,3,4,5,6,7,8,0", 3).unwrap();
        assert_eq!(cells, vec![1, 2, 3, 4, 5, 6, 7, 8, 0]);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let cells = parse_board_text(" 3 ,1, 2 ,0", 2).unwrap();
        assert_eq!(cells, vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        assert_eq!(
            parse_board_text("1,2,3", 2).unwrap_err(),
            ParseBoardError::WrongCount {
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(
            parse_board_text("1,x,3,0", 2).unwrap_err(),
            ParseBoardError::NotANumber("x".to_string())
        );
        // Negative numbers are not tile values either.
        assert_eq!(
            parse_board_text("1,-2,3,0", 2).unwrap_err(),
            ParseBoardError::NotANumber("-2".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        assert_eq!(
            parse_board_text("1,2,2,0", 2).unwrap_err(),
            ParseBoardError::Duplicate(2)
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            parse_board_text("1,2,9,0", 2).unwrap_err(),
            ParseBoardError::OutOfRange { found: 9, n: 2 }
        );
    }

    #[test]
    fn test_parse_requires_blank() {
        // 0 missing means some other value must repeat or overflow.
        assert_eq!(
            parse_board_text("1,2,3,4", 2).unwrap_err(),
            ParseBoardError::OutOfRange { found: 4, n: 2 }
        );
    }

    #[test]
    fn test_solution_steps_numbering_and_text() {
        let moves = [
            Move {
                tile: 7,
                from: (2, 1),
                to: (2, 0),
                direction: Direction::Left,
            },
            Move {
                tile: 8,
                from: (2, 2),
                to: (2, 1),
                direction: Direction::Left,
            },
        ];
        let steps = solution_steps(&moves);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step, 1);
        assert_eq!(steps[1].step, 2);
        assert_eq!(steps[0].tile, 7);
        assert_eq!(steps[1].description, "Move tile 8 left");
        assert_eq!(steps[1].from, (2, 2));
        assert_eq!(steps[1].to, (2, 1));
    }

    #[test]
    fn test_solution_steps_empty() {
        assert!(solution_steps(&[]).is_empty());
    }
}
