//! # N-Puzzle Solver Library
//!
//! This library solves generalized N×N sliding-tile puzzles (the 15-puzzle
//! family) by computing a minimal or near-minimal sequence of single-tile
//! moves transforming an initial board into a target board.
//!
//! The solver is built for embedding in an interactive host: it runs
//! cooperatively, publishing progress snapshots and polling a cancellation
//! flag at fixed checkpoints, and it degrades gracefully through three
//! search tiers (A*, then IDA*, then a guided best-first fallback) when an
//! optimal search would exceed its resource budget.
//!
//! It is used by two binaries:
//! - `solve`: Reads board descriptions and prints the solution steps.
//! - `scramble`: Generates reproducible solvable boards by walking random
//!   legal moves from a solved position.
//!
//! ## Modules
//! - `engine`: Board representation (`Board`), moves (`Move`, `Direction`),
//!   state keys, neighbor enumeration, move replay, and the parity-based
//!   solvability test.
//! - `heuristics`: Goal-position tables and the admissible estimate
//!   (Manhattan distance plus linear-conflict penalty).
//! - `solver`: The stable priority queue, the three search tiers, and the
//!   `Solver` orchestrator with its limits, progress, and error types.
//! - `utils`: Board text parsing and solution-step formatting.

pub mod engine;
pub mod heuristics;
pub mod solver;
pub mod utils;

pub use engine::{apply_moves, is_solvable, Board, BoardError, Direction, Move};
pub use solver::{solve, Progress, SearchLimits, SolveError, Solver};
pub use utils::{parse_board_text, solution_steps, ParseBoardError, SolutionStep};
