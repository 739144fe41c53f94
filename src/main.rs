//! Scacchiera command-line entry point: pick one move for a position

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use scacchiera::board::START_FEN;
use scacchiera::{Board, Engine, EngineConfig, SearchParams};

#[derive(Parser, Debug)]
#[command(author, version, about = "Choose a move for a chess position within a time budget")]
struct Args {
    /// Position to move from
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    /// Moves already played from `--fen`, in long algebraic notation
    #[arg(short, long, num_args = 0..)]
    moves: Vec<String>,

    /// Time left on the mover's clock
    #[arg(short, long, default_value_t = 60_000)]
    time_ms: u64,

    /// Increment added after every move
    #[arg(short, long, default_value_t = 0)]
    increment_ms: u64,

    /// Polyglot opening book
    #[arg(short, long)]
    book: Option<PathBuf>,

    /// Maximum search depth in plies
    #[arg(short, long, default_value_t = 64)]
    depth: u8,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    scacchiera::init();

    let mut board =
        Board::from_fen(&args.fen).with_context(|| format!("bad --fen '{}'", args.fen))?;

    let config = EngineConfig {
        book_path: args.book,
        search: SearchParams::new().max_depth(args.depth),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config);
    engine.notify_game_start(args.increment_ms);

    for text in &args.moves {
        engine.record_position(&board);
        let mv = board.parse_move(text)?;
        board = board.apply_move(mv);
    }

    let mv = engine.compute_best_move(&board, args.time_ms)?;
    match engine.last_result() {
        Some(result) => println!(
            "bestmove {} (score {}, depth {}, {} nodes)",
            mv, result.score, result.depth, result.nodes
        ),
        None => println!("bestmove {mv}"),
    }
    Ok(())
}
