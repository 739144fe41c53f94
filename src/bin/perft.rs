use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use scacchiera::board::{Board, START_FEN};
use scacchiera::movegen::MoveGen;

#[derive(Parser, Debug)]
#[command(author, version, about = "Count leaf nodes of the legal move tree", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    #[arg(short, long, default_value_t = 4)]
    depth: u32,

    /// Break the count down by root move
    #[arg(long)]
    divide: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let board =
        Board::from_fen(&args.fen).with_context(|| format!("bad --fen '{}'", args.fen))?;
    let movegen = MoveGen::new();

    println!("Running perft on FEN: '{}' at depth {}", args.fen, args.depth);

    let start = Instant::now();
    let nodes = if args.divide {
        let counts = movegen.divide(&board, args.depth);
        for (mv, count) in &counts {
            println!("{mv}: {count}");
        }
        counts.iter().map(|(_, count)| count).sum()
    } else {
        movegen.perft(&board, args.depth)
    };
    let duration = start.elapsed();

    println!(
        "perft({}) = {} nodes ({} ms, {:.2} Mnps)",
        args.depth,
        nodes,
        duration.as_millis(),
        nodes as f64 / (duration.as_micros().max(1) as f64)
    );
    Ok(())
}
