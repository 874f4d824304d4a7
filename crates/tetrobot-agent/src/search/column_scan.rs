use std::{cmp::Ordering, iter};

use tetrobot_engine::{BoardEngine, Move, PieceKind, Position};

use super::{PlacementSearch, SearchOutcome, to_i32};
use crate::heuristic::BoardEvaluator;

/// Rotate, shift, then hard-drop in every column.
///
/// For each rotation count the scan computes the shape's horizontal footprint
/// and tries every column where the footprint fits, including negative anchors
/// when the bounding box has empty leading columns. A candidate is built by
/// playing the rotations and then one shift at a time from the current
/// position, so columns walled off near the top are skipped and every scored
/// landing is one the plan can reach. The resulting plan is `rotate × r`, then
/// the shifts toward the target column, then one drop per row fallen plus the
/// landing drop.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnScanSearch;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    rotations: u8,
    col: i32,
    landing_row: i32,
}

impl PlacementSearch for ColumnScanSearch {
    fn search(&self, engine: &BoardEngine, evaluator: &dyn BoardEvaluator) -> SearchOutcome {
        let base = engine.fork();
        let Some(&start) = base.active_piece() else {
            return SearchOutcome::empty();
        };
        let rotation_counts = if start.kind() == PieceKind::O { 1 } else { 4 };
        let cols = to_i32(base.cols());

        let mut candidate = base.clone();
        let mut explored = 0;
        let mut best_score = f32::MIN;
        let mut best = None;

        for rotations in 0..rotation_counts {
            let Some((offset, width)) = start.mask().rotated_by(rotations).column_span() else {
                continue;
            };
            let (offset, width) = (to_i32(offset), to_i32(width));
            for col in -offset..=cols - offset - width {
                candidate.clone_from(&base);
                if !steer(&mut candidate, rotations, col) {
                    continue;
                }
                let Some(landing) = candidate.hard_drop() else {
                    continue;
                };
                explored += 1;
                let stats = candidate.statistics();
                let score = evaluator.evaluate(&stats);
                log::trace!("rotation {rotations} column {col} scored {score}: {stats:?}");
                if score > best_score {
                    best_score = score;
                    best = Some(Candidate {
                        rotations,
                        col,
                        landing_row: landing.row(),
                    });
                }
            }
        }

        let Some(best) = best else {
            return SearchOutcome {
                explored,
                ..SearchOutcome::empty()
            };
        };
        SearchOutcome {
            score: best_score,
            moves: plan(start.position(), best),
            explored,
        }
    }
}

/// Plays `rotate × rotations`, then single shifts until the anchor is at `col`.
/// Returns `false` as soon as a step is blocked.
fn steer(engine: &mut BoardEngine, rotations: u8, col: i32) -> bool {
    if !(0..rotations).all(|_| engine.rotate()) {
        return false;
    }
    loop {
        let Some(current) = engine.active_piece().map(|piece| piece.position().col()) else {
            return false;
        };
        let shifted = match col.cmp(&current) {
            Ordering::Equal => return true,
            Ordering::Less => engine.shift_left(),
            Ordering::Greater => engine.shift_right(),
        };
        if !shifted {
            return false;
        }
    }
}

fn plan(start: Position, candidate: Candidate) -> Vec<Move> {
    let shift = if candidate.col < start.col() {
        Move::ShiftLeft
    } else {
        Move::ShiftRight
    };
    let shifts = candidate.col.abs_diff(start.col()) as usize;
    let drops = usize::try_from(candidate.landing_row - start.row() + 1).unwrap_or(1);
    iter::repeat_n(Move::Rotate, usize::from(candidate.rotations))
        .chain(iter::repeat_n(shift, shifts))
        .chain(iter::repeat_n(Move::Drop, drops))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        heuristic::{HeuristicEvaluator, HeuristicWeights},
        search::{SearchStrategy, tests::assert_plan_reproduces},
    };

    #[test]
    fn test_o_piece_on_empty_board_goes_to_wall() {
        let mut engine = BoardEngine::new();
        engine.spawn(PieceKind::O);
        let evaluator = HeuristicEvaluator::new(HeuristicWeights::new(-1.0, -1.0, -1.0, 1.0));

        let outcome = ColumnScanSearch.search(&engine, &evaluator);
        // columns 0..=8, a single orientation
        assert_eq!(outcome.explored, 9);
        // two columns of height 2 against the wall: bumpiness 2, height 4
        assert_eq!(outcome.score, -6.0);

        let mut expected = vec![Move::ShiftLeft; 4];
        expected.extend([Move::Drop; 19]);
        assert_eq!(outcome.moves, expected);

        let stats = assert_plan_reproduces(&engine, &evaluator, &outcome);
        assert_eq!(stats.holes, 0);
        assert_eq!(stats.aggregate_height, 4);
    }

    #[test]
    fn test_columns_walled_off_at_spawn_are_skipped() {
        // The open well on the left is only reachable by passing through column 3.
        let art = iter::once("...I......")
            .chain(iter::repeat_n("...IIIIIII", 18))
            .collect::<Vec<_>>()
            .join("\n");
        let mut engine = BoardEngine::from_ascii(20, &art);
        assert!(engine.spawn(PieceKind::O));
        let evaluator = HeuristicEvaluator::new(HeuristicWeights::new(-1.0, -1.0, -1.0, 1.0));

        let outcome = ColumnScanSearch.search(&engine, &evaluator);
        // columns 4..=8 only
        assert_eq!(outcome.explored, 5);
        assert_eq!(outcome.score, -153.0);
        assert_eq!(outcome.moves, [Move::Drop]);
        assert_plan_reproduces(&engine, &evaluator, &outcome);

        let bfs = SearchStrategy::BreadthFirst.search(&engine, &evaluator);
        assert!(bfs.score >= outcome.score);
        assert_eq!(bfs.score, -153.0);
    }

    #[test]
    fn test_negative_columns_are_scanned() {
        let mut engine = BoardEngine::from_ascii(
            20,
            "
            .IIIIIIIII
            .IIIIIIIII
            .IIIIIIIII
            ",
        );
        engine.spawn(PieceKind::I);
        let evaluator = HeuristicEvaluator::new(HeuristicWeights::new(-0.1, -0.1, -1.0, 1.0));

        let outcome = ColumnScanSearch.search(&engine, &evaluator);
        // vertical I has one empty leading column, so column 0 needs anchor -1
        assert_eq!(outcome.explored, 7 + 10 + 7 + 10);
        let stats = assert_plan_reproduces(&engine, &evaluator, &outcome);
        assert_eq!(stats.cleared, 3);
        assert_eq!(outcome.moves[0], Move::Rotate);
        assert_eq!(outcome.moves[1..5], [Move::ShiftLeft; 4]);
        assert_eq!(outcome.moves[5], Move::Drop);
    }

    #[test]
    fn test_rotation_counts() {
        let evaluator = HeuristicEvaluator::new(HeuristicWeights::BASELINE);
        for (kind, expected) in [
            // flat 4 wide: 7 columns, vertical: 10 columns
            (PieceKind::I, 7 + 10 + 7 + 10),
            (PieceKind::O, 9),
            (PieceKind::T, 8 + 9 + 8 + 9),
        ] {
            let mut engine = BoardEngine::new();
            engine.spawn(kind);
            let outcome = ColumnScanSearch.search(&engine, &evaluator);
            assert_eq!(outcome.explored, expected, "{kind}");
        }
    }
}
