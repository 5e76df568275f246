//! A generator for creating a Connect Four opening book.

use crate::{GameStatus, OpeningBook, Position, Solver};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// A utility struct for generating a new `OpeningBook`.
///
/// Generation is a single depth-bounded recursive descent from the empty position, memoized
/// by position key (and mirrored key) so that transposed move orders are only solved once.
pub struct OpeningBookGenerator;

impl OpeningBookGenerator {
    /// Generates book entries for every position up to `max_depth` plies.
    ///
    /// Positions at `max_depth` are evaluated with `solver`'s dichotomic solve; positions
    /// short of `max_depth` are scored as `max(-child_score)` over their legal children.
    pub fn generate(solver: &mut Solver, max_depth: u8) -> OpeningBook {
        let mut map = HashMap::new();
        let progress = Self::create_progress_bar();

        let root = Position::new();
        Self::generate_recursive(solver, &root, max_depth, &mut map, &progress);

        progress.finish_with_message(format!("generated {} positions", map.len()));
        OpeningBook { map, depth: max_depth as i8 }
    }

    /// Scores `position`, memoizing (and returning) the result. Recurses into every legal
    /// child when `position` is short of `max_depth`.
    fn generate_recursive(
        solver: &mut Solver,
        position: &Position,
        max_depth: u8,
        map: &mut HashMap<u64, i8>,
        progress: &ProgressBar,
    ) -> i8 {
        let key = position.get_key();
        let mirrored_key = position.get_mirrored_key();

        if let Some(&score) = map.get(&key).or_else(|| map.get(&mirrored_key)) {
            return score;
        }

        let score = if position.status() != GameStatus::InProgress {
            Solver::terminal_score(position).expect("status is already decided")
        } else if (position.get_moves() as u8) < max_depth {
            let possible = position.possible();
            let mut best = i8::MIN;

            for col in 0..Position::WIDTH {
                if possible & Position::column_mask(col) == 0 {
                    continue;
                }

                let mut child = *position;
                child.play(col).expect("column drawn from the possible mask is always playable");
                let child_score = Self::generate_recursive(solver, &child, max_depth, map, progress);
                best = best.max(-child_score);
            }

            best
        } else {
            solver.solve(position, false)
        };

        map.insert(key, score);
        progress.inc(1);
        score
    }

    /// Creates a spinner-style progress bar for tracking book generation.
    fn create_progress_bar() -> ProgressBar {
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] generated {human_pos} positions ({per_sec})",
        )
        .unwrap();
        ProgressBar::new_spinner().with_style(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "generates a depth-1 book, solving every first move fully; expensive"]
    fn generated_book_scores_the_empty_position_with_its_negamax_value() {
        let mut solver = Solver::new();
        let book = OpeningBookGenerator::generate(&mut solver, 1);

        let root = Position::new();
        let expected = solver.negamax_full(&root);
        assert_eq!(book.get(&root), Some(expected));
        assert_eq!(book.depth, 1);
    }

    #[test]
    #[ignore = "generates a depth-2 book, solving several positions fully; expensive"]
    fn generated_book_agrees_with_direct_solves_at_the_leaves() {
        let mut solver = Solver::new();
        let book = OpeningBookGenerator::generate(&mut solver, 2);

        for seq in ["11", "44", "47"] {
            let pos = Position::from_moves(seq).unwrap();
            let mut fresh_solver = Solver::new();
            let expected = fresh_solver.solve(&pos, false);
            assert_eq!(book.get(&pos), Some(expected));
        }
    }
}
