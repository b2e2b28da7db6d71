use log::debug;
use web_time::Instant;

use crate::ai::eval::Evaluation;
use crate::config::SearchConfig;
use crate::error::EngineError;
use crate::game::Match;
use crate::types::{Coord, GameState, Side};

const MIN_SCORE: i32 = i32::MIN;
const MAX_SCORE: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchResult {
    Complete(i32),
    TimedOut,
}

/// Outcome of one [`SearchAgent::search`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    pub best_move: Coord,
    /// Backed-up score of `best_move` from the agent's point of view.
    pub score: i32,
    /// Deepest fully searched depth. Zero when the only legal move was returned unsearched.
    pub depth: u8,
    pub nodes: u64,
    pub cutoffs: u64,
    pub timed_out: bool,
}

/// Minimax player with alpha-beta pruning for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchAgent {
    side: Side,
    config: SearchConfig,
}

impl SearchAgent {
    pub fn new(side: Side, config: SearchConfig) -> Self {
        Self { side, config }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn choose_move(&self, game: &Match) -> Result<Coord, EngineError> {
        self.search(game).map(|report| report.best_move)
    }

    /// Searches the best move for this agent's side.
    /// Caller contract: `game` is in progress and it is this agent's turn;
    /// otherwise `InvalidState` is returned. `game` itself is never modified.
    ///
    /// Moves are tried in row-major order and the first of equally scored
    /// moves is kept, so identical positions always yield the same move.
    pub fn search(&self, game: &Match) -> Result<SearchReport, EngineError> {
        if game.state() != GameState::InProgress {
            return Err(EngineError::InvalidState("match is not in progress"));
        }
        if game.side_to_move() != self.side {
            return Err(EngineError::InvalidState("it is not this agent's turn"));
        }

        let moves = game.legal_moves(self.side);
        let Some(&first) = moves.first() else {
            return Err(EngineError::InvalidState("no legal moves"));
        };
        if moves.len() == 1 {
            return Ok(SearchReport {
                best_move: first,
                score: self.config.evaluation.evaluate(game.board(), self.side),
                depth: 0,
                nodes: 0,
                cutoffs: 0,
                timed_out: false,
            });
        }

        let max_depth = self.config.max_depth.max(1);
        let (deadline, first_depth) = match self.config.time_budget() {
            Some(budget) => (Some(Instant::now() + budget), 1),
            None => (None, max_depth),
        };

        let mut work = game.clone();
        let mut searcher = Searcher {
            me: self.side,
            evaluation: self.config.evaluation,
            deadline,
            nodes: 0,
            cutoffs: 0,
            timed_out: false,
        };

        let mut best = None;
        for depth in first_depth..=max_depth {
            match searcher.root(&mut work, &moves, depth)? {
                Some((mv, score)) => best = Some((mv, score, depth)),
                None => break,
            }
        }
        debug_assert_eq!(work.board(), game.board(), "search must restore its working board");
        debug_assert_eq!(work.side_to_move(), game.side_to_move());

        let (best_move, score, depth) =
            best.ok_or(EngineError::InvalidState("search finished no depth"))?;
        debug!(
            "{:?} search: move {best_move} score {score} depth {depth} nodes {} cutoffs {}{}",
            self.side,
            searcher.nodes,
            searcher.cutoffs,
            if searcher.timed_out { " (timed out)" } else { "" }
        );

        Ok(SearchReport {
            best_move,
            score,
            depth,
            nodes: searcher.nodes,
            cutoffs: searcher.cutoffs,
            timed_out: searcher.timed_out,
        })
    }
}

struct Searcher {
    me: Side,
    evaluation: Evaluation,
    deadline: Option<Instant>,
    nodes: u64,
    cutoffs: u64,
    timed_out: bool,
}

impl Searcher {
    /// Returns `None` when the deadline interrupted this depth.
    fn root(
        &mut self,
        work: &mut Match,
        moves: &[Coord],
        depth: u8,
    ) -> Result<Option<(Coord, i32)>, EngineError> {
        let mut best: Option<(Coord, i32)> = None;
        let mut alpha = MIN_SCORE;

        for &mv in moves {
            let record = work.make_move(mv, self.me)?;
            let result = self.minimax(work, 1, depth, alpha, MAX_SCORE);
            work.unmake_move(&record);

            let score = match result? {
                SearchResult::Complete(score) => score,
                SearchResult::TimedOut => return Ok(None),
            };
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        Ok(best)
    }

    /// Every `make_move` here is undone before the next sibling is tried and
    /// before returning, including on cutoffs and timeouts.
    fn minimax(
        &mut self,
        work: &mut Match,
        ply: u8,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
    ) -> Result<SearchResult, EngineError> {
        self.nodes += 1;

        // Depth 1 always runs to completion.
        if depth > 1 && self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.timed_out = true;
            return Ok(SearchResult::TimedOut);
        }

        if work.state() == GameState::Finished {
            return Ok(SearchResult::Complete(
                self.evaluation.terminal(work.board(), self.me),
            ));
        }
        if ply >= depth {
            return Ok(SearchResult::Complete(
                self.evaluation.evaluate(work.board(), self.me),
            ));
        }

        // A pass can hand the turn straight back, so the role follows the side to move.
        let side = work.side_to_move();
        let maximizing = side == self.me;
        let mut best = if maximizing { MIN_SCORE } else { MAX_SCORE };

        for mv in work.legal_moves(side) {
            let record = work.make_move(mv, side)?;
            let result = self.minimax(work, ply + 1, depth, alpha, beta);
            work.unmake_move(&record);

            let score = match result? {
                SearchResult::Complete(score) => score,
                SearchResult::TimedOut => return Ok(SearchResult::TimedOut),
            };
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                self.cutoffs += 1;
                break;
            }
        }

        Ok(SearchResult::Complete(best))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::types::Player;

    fn at(row: u8, col: u8) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn opening() -> Match {
        Match::from_config(&MatchConfig::default()).unwrap()
    }

    fn position(diagram: &str, to_move: Side) -> Match {
        let players = [
            Player::automated("Dark", Side::Dark),
            Player::automated("Light", Side::Light),
        ];
        Match::from_position(diagram.parse().unwrap(), players, to_move).unwrap()
    }

    /// Plain minimax over cloned matches.
    fn reference_minimax(game: &Match, me: Side, ply: u8, depth: u8) -> i32 {
        if game.is_game_over() || ply >= depth {
            return game.board().disc_difference(me);
        }
        let side = game.side_to_move();
        let scores = game.legal_moves(side).into_iter().map(|mv| {
            let mut next = game.clone();
            next.apply_move(mv, side).unwrap();
            reference_minimax(&next, me, ply + 1, depth)
        });
        if side == me {
            scores.max().unwrap()
        } else {
            scores.min().unwrap()
        }
    }

    fn reference_best(game: &Match, depth: u8) -> (Coord, i32) {
        let me = game.side_to_move();
        let mut best: Option<(Coord, i32)> = None;
        for mv in game.legal_moves(me) {
            let mut next = game.clone();
            next.apply_move(mv, me).unwrap();
            let score = reference_minimax(&next, me, 1, depth);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }
        best.unwrap()
    }

    /// A few plies into a game, so searches start from varied positions.
    fn midgame(plies: usize) -> Match {
        let mut game = opening();
        for ply in 0..plies {
            let side = game.side_to_move();
            let moves = game.legal_moves(side);
            game.apply_move(moves[ply % moves.len()], side).unwrap();
        }
        game
    }

    #[test]
    fn search_returns_single_legal_move_immediately() {
        let game = position(
            "
            .XOOOOOO
            OOOOOOOO
            OOOOOOOO
            OOOOOOOO
            OOOOOOOO
            OOOOOOOO
            OOOOOOOO
            OOOOOOOO",
            Side::Light,
        );
        let agent = SearchAgent::new(Side::Light, SearchConfig::default());

        let report = agent.search(&game).unwrap();

        assert_eq!(report.best_move, at(0, 0));
        assert_eq!(report.depth, 0);
        assert!(!report.timed_out);
    }

    #[test]
    fn search_tie_breaks_to_first_move_when_scores_equal() {
        let agent = SearchAgent::new(Side::Dark, SearchConfig::with_depth(1));

        // Every opening move flips one disc; d3 comes first.
        assert_eq!(agent.choose_move(&opening()), Ok(at(2, 3)));
    }

    #[test]
    fn alpha_beta_agrees_with_plain_minimax() {
        for plies in [0, 3, 6, 9] {
            let game = midgame(plies);
            let side = game.side_to_move();
            if game.legal_moves(side).len() < 2 {
                continue;
            }
            for depth in 1..=4 {
                let agent = SearchAgent::new(side, SearchConfig::with_depth(depth));
                let report = agent.search(&game).unwrap();

                let (expected_move, expected_score) = reference_best(&game, depth);
                assert_eq!(
                    (report.best_move, report.score),
                    (expected_move, expected_score),
                    "plies {plies} depth {depth}"
                );
            }
        }
    }

    #[test]
    fn search_does_not_mutate_the_callers_match() {
        let mut game = midgame(5);
        let side = game.side_to_move();
        let reply = game.legal_moves(side)[0];
        game.apply_move(reply, side).unwrap();
        let before = game.clone();
        let agent = SearchAgent::new(game.side_to_move(), SearchConfig::with_depth(4));

        agent.choose_move(&game).unwrap();

        assert_eq!(game, before);
        assert_eq!(game.position_hash(), before.position_hash());
    }

    #[test]
    fn identical_matches_get_identical_moves() {
        let a = midgame(4);
        let b = midgame(4);
        let agent = SearchAgent::new(a.side_to_move(), SearchConfig::with_depth(5));

        let first = agent.choose_move(&a).unwrap();

        assert_eq!(agent.choose_move(&b), Ok(first));
        assert!(a.is_legal_move(first, a.side_to_move()));
    }

    #[test]
    fn pruning_skips_nodes() {
        let game = opening();
        let agent = SearchAgent::new(Side::Dark, SearchConfig::with_depth(4));

        let report = agent.search(&game).unwrap();

        assert!(report.cutoffs > 0);
        assert_eq!(report.depth, 4);
    }

    #[test]
    fn search_takes_the_game_winning_capture() {
        // h2 flips the whole second row and leaves light with no discs.
        let game = position(
            "
            ........
            XOOOOOO.
            ..X.....
            ........
            ........
            ........
            ........
            ........",
            Side::Dark,
        );
        let agent = SearchAgent::new(Side::Dark, SearchConfig::with_depth(2));

        let report = agent.search(&game).unwrap();

        assert_eq!(report.best_move, at(1, 7));
        assert_eq!(report.score, 9);
    }

    #[test]
    fn positional_evaluation_prefers_the_corner() {
        let diagram = "
            .OX.....
            ........
            ........
            ........
            .OOOX...
            ........
            ........
            ........";
        let game = position(diagram, Side::Dark);

        let greedy = SearchAgent::new(Side::Dark, SearchConfig::with_depth(1));
        let positional = SearchAgent::new(
            Side::Dark,
            SearchConfig {
                max_depth: 1,
                evaluation: Evaluation::Positional,
                ..SearchConfig::default()
            },
        );

        assert_eq!(greedy.choose_move(&game), Ok(at(4, 0)));
        assert_eq!(positional.choose_move(&game), Ok(at(0, 0)));
    }

    #[test]
    fn search_outside_its_turn_is_rejected() {
        let game = opening();
        let agent = SearchAgent::new(Side::Light, SearchConfig::with_depth(2));

        assert_eq!(
            agent.choose_move(&game),
            Err(EngineError::InvalidState("it is not this agent's turn"))
        );
    }

    #[test]
    fn search_on_a_finished_match_is_rejected() {
        let game = position(&format!("{}{}", "X".repeat(32), "O".repeat(32)), Side::Dark);
        let agent = SearchAgent::new(Side::Dark, SearchConfig::with_depth(2));

        assert_eq!(
            agent.choose_move(&game),
            Err(EngineError::InvalidState("match is not in progress"))
        );
    }

    #[test]
    fn depth_one_completes_before_timeout_cutoff() {
        let game = opening();
        let agent = SearchAgent::new(
            Side::Dark,
            SearchConfig {
                max_depth: 6,
                time_budget_ms: Some(0),
                ..SearchConfig::default()
            },
        );

        let report = agent.search(&game).unwrap();

        assert!(game.is_legal_move(report.best_move, Side::Dark));
        assert_eq!(report.depth, 1);
        assert!(report.timed_out);
    }

    #[test]
    fn generous_budget_reaches_full_depth() {
        let game = midgame(2);
        let agent = SearchAgent::new(
            game.side_to_move(),
            SearchConfig {
                max_depth: 3,
                time_budget_ms: Some(60_000),
                ..SearchConfig::default()
            },
        );
        let fixed = SearchAgent::new(game.side_to_move(), SearchConfig::with_depth(3));

        let report = agent.search(&game).unwrap();

        assert_eq!(report.depth, 3);
        assert!(!report.timed_out);
        assert_eq!(report.best_move, fixed.choose_move(&game).unwrap());
    }
}
