//! A thin command-line driver around the `connect4-solver` embedding API.
//!
//! This binary is peripheral tooling: it exercises the library's public surface (playing a
//! move sequence, rendering a board, solving a position, generating or inspecting an opening
//! book file) but contains none of the solver's hard logic itself.

use clap::{Parser, Subcommand};
use connect4_solver::{OpeningBook, OpeningBookGenerator, Position, Solver};
use indicatif::HumanDuration;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "connect4-solver", about = "Play with and solve Connect Four positions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Renders the board reached by playing a sequence of moves from the start of the game.
    Render {
        /// Columns played so far, as digits '1'..='7'.
        moves: String,
    },
    /// Solves a position exactly (or, with --weak, reports only its sign).
    Solve {
        /// Columns played so far, as digits '1'..='7'.
        moves: String,
        /// Report only whether the position is a win, draw, or loss.
        #[arg(long)]
        weak: bool,
        /// An opening book file to consult before falling back to search.
        #[arg(long)]
        book: Option<PathBuf>,
    },
    /// Scores every legal reply to a position.
    Moves {
        /// Columns played so far, as digits '1'..='7'.
        moves: String,
        /// An opening book file to consult before falling back to search.
        #[arg(long)]
        book: Option<PathBuf>,
    },
    /// Opening-book maintenance.
    Book {
        #[command(subcommand)]
        command: BookCommand,
    },
}

#[derive(Subcommand)]
enum BookCommand {
    /// Generates an opening book up to the given ply depth and writes it to a file.
    Generate {
        /// The ply depth to generate up to.
        depth: u8,
        /// Where to write the generated book.
        #[arg(default_value = "book.bin")]
        path: PathBuf,
    },
    /// Looks up a position's score in a previously generated opening book.
    Lookup {
        /// The opening book file to read.
        path: PathBuf,
        /// Columns played so far, as digits '1'..='7'.
        #[arg(default_value = "")]
        moves: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render { moves } => {
            let position = Position::from_moves(&moves)?;
            println!("{position}");
        }
        Command::Solve { moves, weak, book } => {
            let position = Position::from_moves(&moves)?;
            let mut solver = Solver::new();
            if let Some(path) = book {
                solver.load_opening_book(&path)?;
            }

            let start = Instant::now();
            let score = solver.solve(&position, weak);
            let elapsed = start.elapsed();

            println!("score: {score}");
            println!(
                "explored {} positions in {}",
                solver.explored_positions,
                HumanDuration(elapsed)
            );
        }
        Command::Moves { moves, book } => {
            let position = Position::from_moves(&moves)?;
            let mut solver = Solver::new();
            if let Some(path) = book {
                solver.load_opening_book(&path)?;
            }

            for (col, score) in solver.evaluate_moves(&position).into_iter().enumerate() {
                match score {
                    Some(score) => println!("column {}: {score}", col + 1),
                    None => println!("column {}: (not playable)", col + 1),
                }
            }
        }
        Command::Book { command: BookCommand::Generate { depth, path } } => {
            let mut solver = Solver::new();
            let book = OpeningBookGenerator::generate(&mut solver, depth);
            println!("generated {} positions", book.map.len());
            book.save(&path)?;
            println!("saved to {}", path.display());
        }
        Command::Book { command: BookCommand::Lookup { path, moves } } => {
            let book = OpeningBook::load(&path)?;
            let position = Position::from_moves(&moves)?;
            match book.get(&position) {
                Some(score) => println!("score: {score}"),
                None => println!("not present in the book (depth {})", book.depth),
            }
        }
    }

    Ok(())
}
