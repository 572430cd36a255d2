//! 蒙特卡洛（UCT）搜索

use std::time::Duration;

use game_ai::{AiEngine, SearchOptions, SearchStrategyType, SearchTreeNode};
use protocol::{Location, Searchable, Weights};
use tictactoe::TicTacToe;

fn monte_carlo(simulations: u32, ratio: f64) -> SearchOptions {
    SearchOptions::default()
        .with_strategy(SearchStrategyType::MonteCarlo)
        .with_monte_carlo(simulations, ratio)
}

fn best_location(options: SearchOptions, game: &mut TicTacToe) -> (Location, i32) {
    let mut ai: AiEngine<TicTacToe> = AiEngine::new(options, Weights::default()).unwrap();
    let last = game.move_list().last_move().cloned();
    let outcome = ai.search(game, last.as_ref()).unwrap();
    assert!(outcome.completed);
    assert!(outcome.best_move.selected);
    assert_eq!(outcome.best_move.inherited_value, outcome.value);
    (outcome.best_move.to, outcome.value)
}

/// 只剩 (2,2) 一个空位，X 走
fn last_square() -> TicTacToe {
    TicTacToe::from_moves(&[
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 1),
        (1, 0),
        (1, 2),
        (2, 1),
        (2, 0),
    ])
    .unwrap()
}

#[test]
fn test_single_reply_for_any_ratio() {
    for ratio in [0.0, 1.0, 2.0] {
        let mut game = last_square();
        let (to, value) = best_location(monte_carlo(1000, ratio), &mut game);
        assert_eq!(to, Location::new(2, 2), "ratio {}", ratio);
        // 和棋
        assert_eq!(value, 0);
    }

    let mut game = last_square();
    let (to, _) = best_location(monte_carlo(1000, 1.0).with_threads(4), &mut game);
    assert_eq!(to, Location::new(2, 2));
}

#[test]
fn test_finds_immediate_win() {
    let position = TicTacToe::from_moves(&[(0, 0), (1, 0), (0, 1), (1, 1)]).unwrap();
    for threads in [1, 4] {
        let mut game = position.clone();
        let (to, value) = best_location(monte_carlo(1000, 1.0).with_threads(threads), &mut game);
        assert_eq!(to, Location::new(0, 2), "{} threads", threads);
        assert_eq!(value, 1000);
        assert_eq!(game.num_moves(), 4);
    }
}

#[test]
fn test_same_seed_same_result() {
    let options = monte_carlo(300, 1.0).with_seed(42);
    let mut a = TicTacToe::from_moves(&[(1, 1)]).unwrap();
    let mut b = a.clone();
    let first = best_location(options.clone(), &mut a);
    let second = best_location(options, &mut b);
    assert_eq!(first, second);
}

#[test]
fn test_time_limit_still_returns_move() {
    let options = monte_carlo(1_000_000, 1.0).with_time_limit(Duration::ZERO);
    let mut ai: AiEngine<TicTacToe> = AiEngine::new(options, Weights::default()).unwrap();
    let mut game = TicTacToe::new();
    let outcome = ai.search(&mut game, None).unwrap();
    assert!(!outcome.completed);
    assert!(game.board().get(outcome.best_move.to).is_none());
    assert!(ai.percent_done() < 100);
}

#[test]
fn test_exported_tree_follows_visits() {
    let mut ai: AiEngine<TicTacToe> =
        AiEngine::new(monte_carlo(500, 1.0), Weights::default()).unwrap();
    let mut game = TicTacToe::from_moves(&[(1, 1)]).unwrap();
    let mut tree = SearchTreeNode::root();
    let outcome = ai.search_with_tree(&mut game, None, &mut tree).unwrap();

    assert_eq!(tree.num_children(), 8);
    let line = tree.principal_variation();
    assert!(!line.is_empty());
    assert_eq!(line[0].to, outcome.best_move.to);
    assert!(tree
        .children
        .iter()
        .all(|c| c.comment.as_deref().is_some_and(|s| s.starts_with("visits="))));
}

#[test]
fn test_every_root_move_tried_with_large_ratio() {
    for ratio in [1.0, 1e4, 1e9] {
        let mut ai: AiEngine<TicTacToe> =
            AiEngine::new(monte_carlo(1000, ratio), Weights::default()).unwrap();
        let mut game = TicTacToe::new();
        let mut tree = SearchTreeNode::root();
        let outcome = ai.search_with_tree(&mut game, None, &mut tree).unwrap();
        assert!(outcome.best_move.selected);

        assert_eq!(tree.num_children(), 9);
        for child in &tree.children {
            let comment = child.comment.as_deref().unwrap_or_default();
            assert!(
                comment.starts_with("visits=") && !comment.starts_with("visits=0,"),
                "ratio {}: {}",
                ratio,
                comment
            );
        }
    }
}
