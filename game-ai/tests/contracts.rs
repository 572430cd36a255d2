//! 配置校验与 Searchable 约定被违反时的错误

use std::time::Duration;

use game_ai::{
    create_strategy, AiEngine, OptionsError, SearchControl, SearchError, SearchOptions,
    SearchStrategyType,
};
use protocol::{HashKey, Move, MoveList, Perspective, Player, Searchable, Weights};
use tictactoe::TicTacToe;

/// 可注入缺陷的井字棋包装
#[derive(Clone)]
struct Faulty {
    game: TicTacToe,
    /// worth 忽略视角，总返回先手方分值
    asymmetric: bool,
    /// 从不生成走法
    no_moves: bool,
}

impl Faulty {
    fn asymmetric(game: TicTacToe) -> Self {
        Self {
            game,
            asymmetric: true,
            no_moves: false,
        }
    }

    fn stuck(game: TicTacToe) -> Self {
        Self {
            game,
            asymmetric: false,
            no_moves: true,
        }
    }
}

impl Searchable for Faulty {
    type Payload = ();

    fn generate_moves(&self, last: Option<&Move>, weights: &Weights, perspective: Perspective) -> MoveList {
        if self.no_moves {
            return MoveList::new();
        }
        self.game.generate_moves(last, weights, perspective)
    }

    fn generate_urgent_moves(
        &self,
        last: Option<&Move>,
        weights: &Weights,
        perspective: Perspective,
    ) -> MoveList {
        self.game.generate_urgent_moves(last, weights, perspective)
    }

    fn in_jeopardy(&self, last: Option<&Move>, weights: &Weights, perspective: Perspective) -> bool {
        self.game.in_jeopardy(last, weights, perspective)
    }

    fn worth(&self, last: Option<&Move>, weights: &Weights, perspective: Perspective) -> i32 {
        let perspective = if self.asymmetric {
            Perspective::PlayerOne
        } else {
            perspective
        };
        self.game.worth(last, weights, perspective)
    }

    fn make_internal_move(&mut self, mv: &Move) {
        self.game.make_internal_move(mv);
    }

    fn undo_internal_move(&mut self, mv: &Move) {
        self.game.undo_internal_move(mv);
    }

    fn done(&mut self, last: Option<&Move>, record_win: bool) -> bool {
        self.game.done(last, record_win)
    }

    fn hash_key(&self) -> HashKey {
        self.game.hash_key()
    }

    fn move_list(&self) -> &MoveList {
        self.game.move_list()
    }

    fn player_to_move(&self, last: Option<&Move>) -> Player {
        self.game.player_to_move(last)
    }
}

fn rejected(options: SearchOptions) -> Option<SearchError> {
    create_strategy::<TicTacToe>(&options, Weights::default(), SearchControl::default()).err()
}

#[test]
fn test_invalid_options_are_rejected() {
    assert_eq!(
        rejected(SearchOptions::default().with_look_ahead(0)),
        Some(SearchError::InvalidOptions(OptionsError::LookAhead(0)))
    );
    assert_eq!(
        rejected(SearchOptions::default().with_percentage_best_moves(0)),
        Some(SearchError::InvalidOptions(OptionsError::PercentageBestMoves(0)))
    );
    assert_eq!(
        rejected(SearchOptions::default().with_percentage_best_moves(101)),
        Some(SearchError::InvalidOptions(OptionsError::PercentageBestMoves(101)))
    );
    assert_eq!(
        rejected(
            SearchOptions::default()
                .with_strategy(SearchStrategyType::MonteCarlo)
                .with_monte_carlo(0, 1.0)
        ),
        Some(SearchError::InvalidOptions(OptionsError::MaxSimulations))
    );
    assert_eq!(
        rejected(
            SearchOptions::default()
                .with_strategy(SearchStrategyType::MonteCarlo)
                .with_threads(0)
        ),
        Some(SearchError::InvalidOptions(OptionsError::NumThreads))
    );

    let engine = AiEngine::<TicTacToe>::new(
        SearchOptions::default().with_look_ahead(0),
        Weights::default(),
    );
    assert!(matches!(
        engine.err(),
        Some(SearchError::InvalidOptions(OptionsError::LookAhead(0)))
    ));
}

#[test]
fn test_finished_game_cannot_be_searched() {
    let won = TicTacToe::from_moves(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]).unwrap();
    for strategy in [
        SearchStrategyType::Minimax,
        SearchStrategyType::Negamax,
        SearchStrategyType::NegamaxWithMemory,
        SearchStrategyType::NegaScout,
        SearchStrategyType::NegaScoutWithMemory,
        SearchStrategyType::MonteCarlo,
    ] {
        let mut game = won.clone();
        let mut ai: AiEngine<TicTacToe> =
            AiEngine::new(SearchOptions::default().with_strategy(strategy), Weights::default())
                .unwrap();
        let err = ai.search(&mut game, None).err();
        assert_eq!(err, Some(SearchError::GameOver { moves_played: 5 }), "{:?}", strategy);
    }
}

#[test]
fn test_missing_moves_reported() {
    for strategy in [
        SearchStrategyType::Minimax,
        SearchStrategyType::Negamax,
        SearchStrategyType::NegaScout,
        SearchStrategyType::MonteCarlo,
    ] {
        let mut game = Faulty::stuck(TicTacToe::from_moves(&[(1, 1)]).unwrap());
        let mut ai: AiEngine<Faulty> =
            AiEngine::new(SearchOptions::default().with_strategy(strategy), Weights::default())
                .unwrap();
        let err = ai.search(&mut game, None).err();
        assert_eq!(err, Some(SearchError::NoLegalMoves { moves_played: 1 }), "{:?}", strategy);
        assert_eq!(game.num_moves(), 1);
    }
}

#[cfg(debug_assertions)]
#[test]
fn test_asymmetric_worth_detected() {
    // 一子之后轮到 O，相对分值应当取反
    let mut game = Faulty::asymmetric(TicTacToe::new());
    let mut ai: AiEngine<Faulty> = AiEngine::new(
        SearchOptions::default()
            .with_strategy(SearchStrategyType::Negamax)
            .with_look_ahead(1),
        Weights::default(),
    )
    .unwrap();
    let err = ai.search(&mut game, None).err();
    assert!(matches!(
        err,
        Some(SearchError::AsymmetricWorth {
            player: Player::Two,
            ..
        })
    ));
    assert_eq!(game.num_moves(), 0);

    // 极大极小只使用先手方分值，不受影响
    let mut ai: AiEngine<Faulty> = AiEngine::new(
        SearchOptions::default()
            .with_strategy(SearchStrategyType::Minimax)
            .with_look_ahead(1),
        Weights::default(),
    )
    .unwrap();
    assert!(ai.search(&mut game, None).is_ok());
}

#[test]
fn test_make_and_undo_restore_hash() {
    let mut game = TicTacToe::from_moves(&[(0, 0), (1, 1)]).unwrap();
    let key = game.hash_key();
    let moves = game.generate_moves(None, &Weights::default(), Perspective::PlayerOne);
    for mv in &moves {
        game.make_internal_move(mv);
        assert_ne!(game.hash_key(), key);
        game.undo_internal_move(mv);
        assert_eq!(game.hash_key(), key);
    }

    // 不同落子顺序到达同一局面，键相同
    let a = TicTacToe::from_moves(&[(0, 0), (1, 1), (2, 2)]).unwrap();
    let b = TicTacToe::from_moves(&[(2, 2), (1, 1), (0, 0)]).unwrap();
    assert_eq!(a.hash_key(), b.hash_key());
}

#[test]
fn test_zero_time_limit_for_brute_force() {
    let options = SearchOptions::default()
        .with_strategy(SearchStrategyType::Negamax)
        .with_look_ahead(5)
        .with_time_limit(Duration::ZERO);
    let mut ai: AiEngine<TicTacToe> = AiEngine::new(options, Weights::default()).unwrap();
    let mut game = TicTacToe::new();
    let outcome = ai.search(&mut game, None).unwrap();
    assert!(!outcome.completed);
    assert!(game.board().get(outcome.best_move.to).is_none());
    assert_eq!(game.num_moves(), 0);
}
