use clap::Parser;
use npuzzle_solver::engine::{Board, Direction};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Board dimension (the board is SIZE x SIZE)
    #[clap(short = 'n', long, default_value_t = 4)]
    size: usize,

    /// Number of random moves to walk away from the solved board
    #[clap(short, long, default_value_t = 50)]
    moves: usize,

    /// Seed for the random walk; the same seed always yields the same board
    #[clap(short, long, default_value_t = 514514)]
    seed: u64,

    /// Also print the board as a grid
    #[clap(short, long)]
    pretty: bool,
}

/// Walks `count` random legal moves from the solved board. Never undoes the
/// previous move, so short walks do not collapse back toward the start. The
/// result is solvable by construction.
fn scramble(n: usize, count: usize, seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::solved(n);
    let mut last: Option<Direction> = None;

    for _ in 0..count {
        let candidates: Vec<_> = board
            .neighbors()
            .into_iter()
            .filter(|(_, mv)| last.map_or(true, |d| mv.direction != d.opposite()))
            .collect();
        if candidates.is_empty() {
            break; // 1x1 board: nothing to walk
        }
        let (next, mv) = candidates[rng.gen_range(0..candidates.len())].clone();
        last = Some(mv.direction);
        board = next;
    }
    board
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let board = scramble(args.size, args.moves, args.seed);

    let cells: Vec<String> = board.cells().iter().map(|v| v.to_string()).collect();
    println!("{}", cells.join(","));
    if args.pretty {
        eprintln!("\n{}", board);
    }
}
