use std::collections::{HashSet, VecDeque};

use arrayvec::ArrayVec;
use tetrobot_engine::{BoardEngine, Move, Orientation, PieceKind, Position};

use super::{PlacementSearch, SearchOutcome, to_i32};
use crate::heuristic::BoardEvaluator;

/// Breadth-first search over `(row, col, orientation)` states.
///
/// Each state tries rotate, shift-left, shift-right and drop. Moves that fail
/// are skipped, drops that land are scored, and every other move enqueues the
/// resulting state if it was not seen before. The O-piece never rotates since
/// rotation does not change its cells.
///
/// With `skip_empty_rows` enabled the piece first falls straight down while its
/// whole bounding box stays above the highest filled cell. Those rows offer no
/// distinct landings, so skipping them only shrinks the frontier.
#[derive(Debug, Clone, Copy)]
pub struct BreadthFirstSearch {
    skip_empty_rows: bool,
}

impl Default for BreadthFirstSearch {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Arena entry: the state plus the edge it was reached by.
#[derive(Debug, Clone, Copy)]
struct Node {
    parent: Option<(usize, Move)>,
    position: Position,
    orientation: Orientation,
}

type StateKey = (i32, i32, u8);

fn state_key(position: Position, orientation: Orientation) -> StateKey {
    (position.row(), position.col(), orientation.quarter_turns())
}

impl BreadthFirstSearch {
    #[must_use]
    pub const fn new(skip_empty_rows: bool) -> Self {
        Self { skip_empty_rows }
    }

    fn skip_empty_rows(engine: &mut BoardEngine, prefix: &mut Vec<Move>) {
        let limit = to_i32(
            engine
                .board()
                .topmost_occupied_row()
                .unwrap_or(engine.rows()),
        );
        while let Some(piece) = engine.active_piece() {
            let next_bottom = piece.position().row() + 1 + to_i32(piece.mask().size());
            if next_bottom > limit {
                break;
            }
            engine.step_down();
            prefix.push(Move::Drop);
        }
    }
}

impl PlacementSearch for BreadthFirstSearch {
    fn search(&self, engine: &BoardEngine, evaluator: &dyn BoardEvaluator) -> SearchOutcome {
        let mut base = engine.fork();
        let mut prefix = Vec::new();
        if self.skip_empty_rows {
            Self::skip_empty_rows(&mut base, &mut prefix);
        }
        let Some(&start) = base.active_piece() else {
            return SearchOutcome::empty();
        };

        let actions: ArrayVec<Move, 4> = Move::ALL
            .into_iter()
            .filter(|mv| !(*mv == Move::Rotate && start.kind() == PieceKind::O))
            .collect();

        let mut nodes = vec![Node {
            parent: None,
            position: start.position(),
            orientation: start.orientation(),
        }];
        let mut visited = HashSet::from([state_key(start.position(), start.orientation())]);
        let mut queue = VecDeque::from([0]);

        let mut scratch = base.clone();
        let mut scratch_landed = false;
        let mut best_score = f32::MIN;
        let mut best_edge = None;

        while let Some(index) = queue.pop_front() {
            let Node {
                position,
                orientation,
                ..
            } = nodes[index];
            for &mv in &actions {
                // only a landing touches the board, so restore the board lazily
                if scratch_landed {
                    scratch.clone_from(&base);
                    scratch_landed = false;
                }
                if !scratch.reposition(position, orientation) || !scratch.apply(mv) {
                    continue;
                }
                let Some(piece) = scratch.active_piece() else {
                    scratch_landed = true;
                    let stats = scratch.statistics();
                    let score = evaluator.evaluate(&stats);
                    log::trace!("landing from {position} {orientation} scored {score}: {stats:?}");
                    if score > best_score {
                        best_score = score;
                        best_edge = Some((index, mv));
                    }
                    continue;
                };
                if visited.insert(state_key(piece.position(), piece.orientation())) {
                    nodes.push(Node {
                        parent: Some((index, mv)),
                        position: piece.position(),
                        orientation: piece.orientation(),
                    });
                    queue.push_back(nodes.len() - 1);
                }
            }
        }

        let Some((mut index, last)) = best_edge else {
            return SearchOutcome {
                explored: nodes.len(),
                ..SearchOutcome::empty()
            };
        };
        let mut path = vec![last];
        while let Some((parent, mv)) = nodes[index].parent {
            path.push(mv);
            index = parent;
        }
        prefix.extend(path.into_iter().rev());

        SearchOutcome {
            score: best_score,
            moves: prefix,
            explored: nodes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        heuristic::{HeuristicEvaluator, HeuristicWeights},
        search::{ColumnScanSearch, tests::assert_plan_reproduces},
    };

    fn overhang() -> BoardEngine {
        BoardEngine::from_ascii(
            20,
            "
            IIII......
            I.........
            ",
        )
    }

    #[test]
    fn test_slides_under_overhang() {
        let mut engine = overhang();
        engine.spawn(PieceKind::I);
        let evaluator = HeuristicEvaluator::new(HeuristicWeights::new(-1.0, -1.0, -10.0, 1.0));

        let bfs = BreadthFirstSearch::default().search(&engine, &evaluator);
        let scan = ColumnScanSearch.search(&engine, &evaluator);
        assert!(bfs.score > scan.score);

        let stats = assert_plan_reproduces(&engine, &evaluator, &bfs);
        assert_eq!(stats.holes, 0);
        assert_eq!(stats.aggregate_height, 9);
        assert_eq!(stats.bumpiness, 2);
        assert_eq!(bfs.score, -11.0);

        // the I ends up sliding left along the floor
        let slides = bfs
            .moves
            .iter()
            .rev()
            .skip(1)
            .take_while(|mv| **mv == Move::ShiftLeft)
            .count();
        assert!(slides >= 2, "{:?}", bfs.moves);
    }

    #[test]
    fn test_skipping_rows_keeps_best_score() {
        let evaluator = HeuristicEvaluator::new(HeuristicWeights::BASELINE);
        for kind in PieceKind::ALL {
            let mut engine = overhang();
            engine.spawn(kind);
            let skipped = BreadthFirstSearch::new(true).search(&engine, &evaluator);
            let full = BreadthFirstSearch::new(false).search(&engine, &evaluator);
            assert_eq!(skipped.score, full.score, "{kind}");
            assert!(skipped.explored < full.explored, "{kind}");
            assert_plan_reproduces(&engine, &evaluator, &skipped);
            assert_plan_reproduces(&engine, &evaluator, &full);
        }
    }

    #[test]
    fn test_skip_stops_above_stack() {
        let mut engine = overhang();
        engine.spawn(PieceKind::T);
        let mut prefix = Vec::new();
        BreadthFirstSearch::skip_empty_rows(&mut engine, &mut prefix);
        // T box is 3 rows tall and must stay above row 18
        assert_eq!(prefix.len(), 15);
        assert_eq!(engine.active_piece().unwrap().position().row(), 15);
    }

    #[test]
    fn test_o_piece_states_have_single_orientation() {
        let mut engine = BoardEngine::new();
        engine.spawn(PieceKind::O);
        let evaluator = HeuristicEvaluator::new(HeuristicWeights::BASELINE);
        let outcome = BreadthFirstSearch::new(false).search(&engine, &evaluator);
        assert!(!outcome.moves.contains(&Move::Rotate));
        // 19 rows of anchors times 9 columns
        assert_eq!(outcome.explored, 19 * 9);
    }
}
