//! Three-tier search for the sliding-tile puzzle.
//!
//! The public entry point is `Solver::solve` (or the `solve` convenience
//! function), which chains three searchers in order of decreasing ambition:
//! 1. A*: optimal if it completes within its budget.
//! 2. IDA*: iterative deepening over an f-threshold, trading memory for
//!    time, run when A* exceeds its budget.
//! 3. Guided best-first: a capped, non-optimal fallback that tries hard to
//!    return *some* valid solution.
//!
//! Each tier reports a tagged `SearchOutcome`; budget exhaustion is an
//! ordinary value the orchestrator consumes by falling through to the next
//! tier, never an error that escapes to the caller. The searchers are
//! cooperative: at a fixed iteration cadence they publish a `Progress`
//! snapshot to the host's observer and poll the cancellation flag and their
//! wall-clock deadline, so an interactive host stays responsive while a
//! solve runs on its worker thread.
//!
//! All per-solve state (goal positions, goal key, visited sets, cost maps)
//! lives in the solve invocation itself. Concurrent solves share nothing,
//! and identical inputs with identical budgets always produce identical
//! output: ties are broken by a stable queue and the engine's fixed
//! neighbor enumeration order.
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{self, AtomicBool};
use std::time::{Duration, Instant};

use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::engine::{same_parity_class, Board, Move, StateKey};
use crate::heuristics::{estimate, GoalPositions};

/// Fixed slack over the initial estimate: A* discards any branch whose f
/// exceeds `h(start) + ASTAR_SLACK`. Trades completeness on deep-detour
/// positions for a much smaller frontier.
const ASTAR_SLACK: u32 = 15;

/// Iterations between A* checkpoints (progress + cancellation + deadline).
const ASTAR_CADENCE: u64 = 500;
/// Node expansions between IDA* checkpoints.
const IDASTAR_CADENCE: u64 = 2048;
/// Dequeues between fallback checkpoints.
const GREEDY_CADENCE: u64 = 500;

/// Per-tier resource budgets.
///
/// Exceeding any budget is a recoverable condition: the orchestrator falls
/// through to the next tier. The defaults suit interactive 4×4 use; tests
/// and batch callers tighten or loosen them as needed.
#[derive(Clone, Debug)]
pub struct SearchLimits {
    /// Maximum A* dequeue count.
    pub astar_max_iterations: u64,
    /// A* wall-clock budget.
    pub astar_time: Duration,
    /// Maximum IDA* node expansions across all deepening iterations.
    pub idastar_max_expansions: u64,
    /// IDA* wall-clock budget.
    pub idastar_time: Duration,
    /// Ceiling on the IDA* f-threshold.
    pub idastar_threshold_cap: u32,
    /// Maximum states the fallback search may dequeue.
    pub greedy_max_states: u64,
    /// Fallback wall-clock budget.
    pub greedy_time: Duration,
    /// Path length beyond which the fallback abandons a branch.
    pub greedy_max_depth: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            astar_max_iterations: 200_000,
            astar_time: Duration::from_secs(10),
            idastar_max_expansions: 2_000_000,
            idastar_time: Duration::from_secs(10),
            idastar_threshold_cap: 80,
            greedy_max_states: 500_000,
            greedy_time: Duration::from_secs(8),
            greedy_max_depth: 400,
        }
    }
}

/// A progress snapshot published at every checkpoint.
///
/// Fields other than `status` are filled when the running tier has a
/// meaningful value for them.
#[derive(Clone, Debug, Default)]
pub struct Progress {
    /// Human-readable description of what the solver is doing.
    pub status: String,
    /// Iterations (dequeues or expansions) completed in the current tier.
    pub iterations: Option<u64>,
    /// Current open-set size, for tiers that keep one.
    pub open_set_size: Option<usize>,
    /// Current closed/visited-set size, for tiers that keep one.
    pub closed_set_size: Option<usize>,
    /// Best heuristic value seen so far in the current tier.
    pub best_heuristic: Option<u32>,
    /// Rough overall completion estimate in [0, 100].
    pub percent: Option<f32>,
}

/// Caller-visible solve failures.
///
/// Per-tier budget exhaustion never appears here; it is internal control
/// flow. Only total exhaustion across every tier surfaces as `Exhausted`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// Initial and target boards have different dimensions.
    #[error("initial board is {initial}x{initial}, target is {target}x{target}")]
    DimensionMismatch { initial: usize, target: usize },

    /// The initial board can never reach the target by legal moves.
    #[error("initial board cannot reach the target configuration")]
    Unsolvable,

    /// Every tier ran out of budget or search space.
    #[error("no solution found within resource limits")]
    Exhausted,

    /// The cancellation flag was raised.
    #[error("solve cancelled")]
    Cancelled,
}

/// Tagged result of a single search tier.
#[derive(Debug)]
enum SearchOutcome {
    Solved(Vec<Move>),
    BudgetExceeded,
    Exhausted,
    Cancelled,
}

/// An ascending priority queue with stable FIFO extraction among equal
/// priorities.
///
/// `std::collections::BinaryHeap` alone is not stable, so every entry
/// carries a monotonically increasing sequence number that breaks priority
/// ties in insertion order. Stability is what makes the searchers
/// deterministic for identical inputs.
pub struct MinQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    seq: u64,
}

struct Entry<T> {
    priority: u32,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both fields: the max-heap then yields the smallest
        // priority, and among equals the earliest insertion.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> MinQueue<T> {
    pub fn new() -> Self {
        MinQueue {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Inserts an item with the given priority.
    pub fn push(&mut self, item: T, priority: u32) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Entry {
            priority,
            seq,
            item,
        });
    }

    /// Removes and returns the minimum-priority item, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|e| e.item)
    }

    /// The minimum-priority item without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|e| &e.item)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for MinQueue<T> {
    fn default() -> Self {
        MinQueue::new()
    }
}

/// Per-invocation context shared by the three tiers: target-derived data,
/// the cancellation flag, and the progress observer. Built fresh for every
/// solve call so nothing leaks between invocations.
struct Session<'s> {
    goals: GoalPositions,
    goal_key: StateKey,
    cancel: Option<&'s AtomicBool>,
    on_progress: Option<&'s mut dyn FnMut(&Progress)>,
}

impl Session<'_> {
    fn cancelled(&self) -> bool {
        self.cancel
            .map_or(false, |flag| flag.load(atomic::Ordering::Relaxed))
    }

    fn report(&mut self, progress: Progress) {
        if let Some(observer) = self.on_progress.as_mut() {
            observer(&progress);
        }
    }
}

fn percent_toward_goal(initial_h: u32, best_h: u32) -> f32 {
    if initial_h == 0 {
        return 100.0;
    }
    ((initial_h - best_h) as f32 / initial_h as f32 * 100.0).clamp(0.0, 100.0)
}

/// Walks predecessor links from the goal back to the start and reverses the
/// collected moves into start-to-goal order.
fn reconstruct_path(
    came_from: &FxHashMap<StateKey, (StateKey, Move)>,
    start: &StateKey,
    goal: &StateKey,
) -> Vec<Move> {
    let mut moves = Vec::new();
    let mut cursor = goal.clone();
    while cursor != *start {
        let (prev, mv) = came_from
            .get(&cursor)
            .expect("predecessor chain must reach the start");
        moves.push(*mv);
        cursor = prev.clone();
    }
    moves.reverse();
    moves
}

/// Tier 1: classic A* over f = g + h.
///
/// Optimal among the nodes it expands; globally optimal unless the slack
/// pruning or a budget cut off a better path. Keeps an open queue keyed by
/// f, a closed set, a best-g map, and a predecessor map for path
/// reconstruction.
fn astar_search(start: &Board, session: &mut Session<'_>, limits: &SearchLimits) -> SearchOutcome {
    let started = Instant::now();
    let initial_h = estimate(start, &session.goals);
    let prune_bound = initial_h + ASTAR_SLACK;
    let start_key = start.key();

    let mut open: MinQueue<Board> = MinQueue::new();
    let mut closed: FxHashSet<StateKey> = FxHashSet::default();
    let mut best_g: FxHashMap<StateKey, u32> = FxHashMap::default();
    let mut came_from: FxHashMap<StateKey, (StateKey, Move)> = FxHashMap::default();

    best_g.insert(start_key.clone(), 0);
    open.push(start.clone(), initial_h);

    let mut iterations = 0u64;
    let mut best_h = initial_h;

    while let Some(board) = open.pop() {
        if iterations % ASTAR_CADENCE == 0 {
            if session.cancelled() {
                return SearchOutcome::Cancelled;
            }
            if started.elapsed() > limits.astar_time {
                debug!("A* wall-clock budget exceeded after {} iterations", iterations);
                return SearchOutcome::BudgetExceeded;
            }
            session.report(Progress {
                status: "A*: expanding frontier".to_string(),
                iterations: Some(iterations),
                open_set_size: Some(open.len()),
                closed_set_size: Some(closed.len()),
                best_heuristic: Some(best_h),
                percent: Some(percent_toward_goal(initial_h, best_h)),
            });
        }
        if iterations >= limits.astar_max_iterations {
            debug!("A* iteration budget exceeded at {}", iterations);
            return SearchOutcome::BudgetExceeded;
        }
        iterations += 1;

        let key = board.key();
        if key == session.goal_key {
            return SearchOutcome::Solved(reconstruct_path(&came_from, &start_key, &key));
        }
        if !closed.insert(key.clone()) {
            continue;
        }
        let g = best_g[&key];

        for (next, mv) in board.neighbors() {
            let next_key = next.key();
            if closed.contains(&next_key) {
                continue;
            }
            let next_g = g + 1;
            let h = estimate(&next, &session.goals);
            if next_g + h > prune_bound {
                continue;
            }
            if h < best_h {
                best_h = h;
            }
            if let Some(&known) = best_g.get(&next_key) {
                if known <= next_g {
                    continue;
                }
            }
            best_g.insert(next_key.clone(), next_g);
            came_from.insert(next_key, (key.clone(), mv));
            open.push(next, next_g + h);
        }
    }

    SearchOutcome::Exhausted
}

/// One entry of the explicit IDA* depth-first stack.
struct Frame {
    key: StateKey,
    g: u32,
    neighbors: Vec<(Board, Move)>,
    next_child: usize,
    mv: Option<Move>,
}

/// Tier 2: IDA*, iterative deepening on an f-threshold.
///
/// Memory-bounded: the only per-iteration state is the current path (an
/// explicit frame stack plus a path-scoped visited set, maintained
/// insert-on-push / remove-on-pop). The threshold starts at h(start) and
/// grows to the minimum pruned f of the previous iteration. The depth-first
/// walk uses an explicit stack rather than call recursion, so stack depth
/// is bounded by the threshold and checkpoints sit in the loop itself.
fn idastar_search(
    start: &Board,
    session: &mut Session<'_>,
    limits: &SearchLimits,
) -> SearchOutcome {
    let started = Instant::now();
    let initial_h = estimate(start, &session.goals);
    let start_key = start.key();
    if start_key == session.goal_key {
        return SearchOutcome::Solved(Vec::new());
    }

    let mut threshold = initial_h;
    let mut expansions = 0u64;

    loop {
        if session.cancelled() {
            return SearchOutcome::Cancelled;
        }
        if threshold > limits.idastar_threshold_cap {
            debug!("IDA* threshold cap {} exceeded", limits.idastar_threshold_cap);
            return SearchOutcome::BudgetExceeded;
        }
        if started.elapsed() > limits.idastar_time {
            debug!("IDA* wall-clock budget exceeded at threshold {}", threshold);
            return SearchOutcome::BudgetExceeded;
        }
        session.report(Progress {
            status: format!("IDA*: deepening to threshold {}", threshold),
            iterations: Some(expansions),
            best_heuristic: Some(initial_h),
            percent: None,
            ..Progress::default()
        });

        let mut next_threshold: Option<u32> = None;
        let mut on_path: FxHashSet<StateKey> = FxHashSet::default();
        on_path.insert(start_key.clone());
        let mut stack = vec![Frame {
            key: start_key.clone(),
            g: 0,
            neighbors: start.neighbors(),
            next_child: 0,
            mv: None,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next_child >= frame.neighbors.len() {
                // All children tried: backtrack.
                let done = stack.pop().unwrap();
                on_path.remove(&done.key);
                continue;
            }
            let child_idx = frame.next_child;
            frame.next_child += 1;
            let g = frame.g;
            let (child, mv) = frame.neighbors[child_idx].clone();
            let child_key = child.key();

            if on_path.contains(&child_key) {
                continue; // ancestor on the current path
            }
            let child_g = g + 1;
            let f = child_g + estimate(&child, &session.goals);
            if f > threshold {
                next_threshold = Some(next_threshold.map_or(f, |t| t.min(f)));
                continue;
            }
            if child_key == session.goal_key {
                let mut moves: Vec<Move> = stack.iter().filter_map(|fr| fr.mv).collect();
                moves.push(mv);
                return SearchOutcome::Solved(moves);
            }

            if expansions % IDASTAR_CADENCE == 0 {
                if session.cancelled() {
                    return SearchOutcome::Cancelled;
                }
                if started.elapsed() > limits.idastar_time {
                    debug!("IDA* wall-clock budget exceeded mid-iteration");
                    return SearchOutcome::BudgetExceeded;
                }
                session.report(Progress {
                    status: format!(
                        "IDA*: threshold {}, {:.1}s elapsed",
                        threshold,
                        started.elapsed().as_secs_f32()
                    ),
                    iterations: Some(expansions),
                    ..Progress::default()
                });
            }
            if expansions >= limits.idastar_max_expansions {
                debug!("IDA* expansion budget exceeded at {}", expansions);
                return SearchOutcome::BudgetExceeded;
            }
            expansions += 1;

            on_path.insert(child_key.clone());
            stack.push(Frame {
                key: child_key,
                g: child_g,
                neighbors: child.neighbors(),
                next_child: 0,
                mv: Some(mv),
            });
        }

        match next_threshold {
            Some(t) if t > threshold => {
                debug!("IDA* deepening: threshold {} -> {}", threshold, t);
                threshold = t;
            }
            // No branch was pruned: the reachable space under the cap is
            // exhausted without finding the goal.
            _ => return SearchOutcome::Exhausted,
        }
    }
}

/// Tier 3: guided best-first fallback.
///
/// Orders the frontier by `h + depth` and never revisits a state, which
/// sacrifices optimality (and, with the depth cap, completeness) for a high
/// chance of finding *some* solution quickly within hard caps.
fn greedy_search(start: &Board, session: &mut Session<'_>, limits: &SearchLimits) -> SearchOutcome {
    let started = Instant::now();
    let initial_h = estimate(start, &session.goals);
    let start_key = start.key();

    let mut open: MinQueue<(Board, u32)> = MinQueue::new();
    let mut visited: FxHashSet<StateKey> = FxHashSet::default();
    let mut came_from: FxHashMap<StateKey, (StateKey, Move)> = FxHashMap::default();

    visited.insert(start_key.clone());
    open.push((start.clone(), 0), initial_h);

    let mut explored = 0u64;
    let mut best_h = initial_h;

    while let Some((board, depth)) = open.pop() {
        if explored % GREEDY_CADENCE == 0 {
            if session.cancelled() {
                return SearchOutcome::Cancelled;
            }
            if started.elapsed() > limits.greedy_time {
                debug!("fallback wall-clock budget exceeded after {} states", explored);
                return SearchOutcome::BudgetExceeded;
            }
            session.report(Progress {
                status: "fallback: best-first search".to_string(),
                iterations: Some(explored),
                open_set_size: Some(open.len()),
                closed_set_size: Some(visited.len()),
                best_heuristic: Some(best_h),
                percent: Some(percent_toward_goal(initial_h, best_h)),
            });
        }
        if explored >= limits.greedy_max_states {
            debug!("fallback state budget exceeded at {}", explored);
            return SearchOutcome::BudgetExceeded;
        }
        explored += 1;

        let key = board.key();
        if key == session.goal_key {
            return SearchOutcome::Solved(reconstruct_path(&came_from, &start_key, &key));
        }
        if depth >= limits.greedy_max_depth {
            continue; // branch abandoned, even if promising
        }

        for (next, mv) in board.neighbors() {
            let next_key = next.key();
            if !visited.insert(next_key.clone()) {
                continue;
            }
            let h = estimate(&next, &session.goals);
            if h < best_h {
                best_h = h;
            }
            came_from.insert(next_key, (key.clone(), mv));
            open.push((next, depth + 1), h + depth + 1);
        }
    }

    SearchOutcome::Exhausted
}

/// The solve orchestrator.
///
/// Validates the board pair, then tries A*, IDA*, and the best-first
/// fallback in order, treating each tier's budget exhaustion as a logged
/// transition rather than a failure. Construct with defaults via
/// `Solver::new`, or attach limits, a cancellation flag, and a progress
/// observer:
///
/// ```
/// use npuzzle_solver::engine::Board;
/// use npuzzle_solver::solver::Solver;
///
/// let initial =
///     Board::from_cells(4, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 0, 13, 14, 15, 12]).unwrap();
/// let target = Board::solved(4);
///
/// let moves = Solver::new().solve(&initial, &target).unwrap();
/// assert_eq!(moves.len(), 1);
/// ```
pub struct Solver<'a> {
    limits: SearchLimits,
    cancel: Option<&'a AtomicBool>,
    on_progress: Option<Box<dyn FnMut(&Progress) + 'a>>,
}

impl<'a> Solver<'a> {
    pub fn new() -> Self {
        Solver {
            limits: SearchLimits::default(),
            cancel: None,
            on_progress: None,
        }
    }

    pub fn with_limits(limits: SearchLimits) -> Self {
        Solver {
            limits,
            cancel: None,
            on_progress: None,
        }
    }

    /// Attaches a cancellation flag. Raising the flag makes the running
    /// tier return at its next checkpoint and the whole solve fail with
    /// `SolveError::Cancelled`.
    pub fn cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Attaches a progress observer, invoked zero or more times from the
    /// running tier's checkpoints.
    pub fn on_progress(mut self, observer: impl FnMut(&Progress) + 'a) -> Self {
        self.on_progress = Some(Box::new(observer));
        self
    }

    /// Solves the puzzle, returning the ordered move list from `initial` to
    /// `target`.
    ///
    /// # Returns
    /// * `Ok(moves)`: applying `moves` to `initial` yields `target`. The
    ///   list is move-count optimal when A* completed within budget; later
    ///   tiers only promise a valid solution.
    /// * `Err(SolveError::DimensionMismatch)`: board sizes differ.
    /// * `Err(SolveError::Unsolvable)`: the boards are in different parity
    ///   classes; no legal move sequence connects them. Checked before any
    ///   search runs.
    /// * `Err(SolveError::Cancelled)`: the cancellation flag was raised.
    /// * `Err(SolveError::Exhausted)`: every tier ran out of budget or
    ///   space.
    pub fn solve(&mut self, initial: &Board, target: &Board) -> Result<Vec<Move>, SolveError> {
        if initial.n() != target.n() {
            return Err(SolveError::DimensionMismatch {
                initial: initial.n(),
                target: target.n(),
            });
        }
        if initial == target {
            return Ok(Vec::new());
        }
        if !same_parity_class(initial, target) {
            info!("rejecting unsolvable {0}x{0} configuration", initial.n());
            return Err(SolveError::Unsolvable);
        }

        let mut session = Session {
            goals: GoalPositions::from_board(target),
            goal_key: target.key(),
            cancel: self.cancel,
            on_progress: match self.on_progress.as_mut() {
                Some(observer) => Some(observer.as_mut()),
                None => None,
            },
        };

        info!("solving {0}x{0} board", initial.n());

        match astar_search(initial, &mut session, &self.limits) {
            SearchOutcome::Solved(moves) => {
                info!("A* solved in {} moves", moves.len());
                return Ok(moves);
            }
            SearchOutcome::Cancelled => return Err(SolveError::Cancelled),
            outcome => debug!("A* fell through ({:?}), trying IDA*", outcome),
        }

        match idastar_search(initial, &mut session, &self.limits) {
            SearchOutcome::Solved(moves) => {
                info!("IDA* solved in {} moves", moves.len());
                return Ok(moves);
            }
            SearchOutcome::Cancelled => return Err(SolveError::Cancelled),
            outcome => debug!("IDA* fell through ({:?}), trying fallback", outcome),
        }

        match greedy_search(initial, &mut session, &self.limits) {
            SearchOutcome::Solved(moves) => {
                info!("fallback solved in {} moves", moves.len());
                Ok(moves)
            }
            SearchOutcome::Cancelled => Err(SolveError::Cancelled),
            outcome => {
                info!("all tiers exhausted ({:?})", outcome);
                Err(SolveError::Exhausted)
            }
        }
    }
}

impl Default for Solver<'_> {
    fn default() -> Self {
        Solver::new()
    }
}

/// Solves with default limits, no cancellation, and no observer.
pub fn solve(initial: &Board, target: &Board) -> Result<Vec<Move>, SolveError> {
    Solver::new().solve(initial, target)
}
