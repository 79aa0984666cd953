use clap::Parser;
use npuzzle_solver::engine::{apply_moves, Board};
use npuzzle_solver::solver::{Progress, Solver};
use npuzzle_solver::utils::{parse_board_text, solution_steps};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Board dimension (the board is SIZE x SIZE)
    #[clap(short = 'n', long, default_value_t = 4)]
    size: usize,

    /// Comma-separated initial board; reads the board file when omitted
    #[clap(short, long, conflicts_with = "board_file")]
    board: Option<String>,

    /// Comma-separated target board; the canonical solved board when omitted
    #[clap(short, long)]
    target: Option<String>,

    /// Print progress snapshots while searching
    #[clap(short, long)]
    verbose: bool,

    /// Path to a file containing the comma-separated initial board
    board_file: Option<PathBuf>,
}

fn read_board(args: &Args) -> Result<Board, String> {
    let text = match (&args.board, &args.board_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => {
            fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?
        }
        (None, None) => return Err("Provide --board or a board file".to_string()),
    };
    let cells = parse_board_text(text.trim(), args.size).map_err(|e| e.to_string())?;
    Board::from_cells(args.size, cells).map_err(|e| e.to_string())
}

fn read_target(args: &Args) -> Result<Board, String> {
    match &args.target {
        Some(text) => {
            let cells = parse_board_text(text.trim(), args.size).map_err(|e| e.to_string())?;
            Board::from_cells(args.size, cells).map_err(|e| e.to_string())
        }
        None => Ok(Board::solved(args.size)),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let (initial, target) = match (read_board(&args), read_target(&args)) {
        (Ok(initial), Ok(target)) => (initial, target),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Initial board:\n{}", initial);
    println!("Target board:\n{}", target);

    let verbose = args.verbose;
    let mut solver = Solver::new().on_progress(move |p: &Progress| {
        if verbose {
            match p.percent {
                Some(pct) => eprintln!("[{:5.1}%] {}", pct, p.status),
                None => eprintln!("[     ] {}", p.status),
            }
        }
    });

    match solver.solve(&initial, &target) {
        Ok(moves) => {
            if moves.is_empty() {
                println!("Board is already in the target configuration.");
                return ExitCode::SUCCESS;
            }
            println!("Solution found ({} moves):\n", moves.len());
            for step in solution_steps(&moves) {
                println!("  Step {}: {}", step.step, step.description);
            }
            // Replay as a final sanity check and show the end position.
            match apply_moves(&initial, &moves) {
                Ok(boards) => println!("\nFinal board:\n{}", boards.last().unwrap()),
                Err(e) => {
                    eprintln!("Error: solution failed to replay: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
