//! 单局对弈
//!
//! 两个引擎在各自独占的棋盘副本上轮流搜索落子，记录每步用时和搜索统计

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use game_ai::AiEngine;
use protocol::{Player, Searchable, Weights};
use serde::{Deserialize, Serialize};
use tictactoe::TicTacToe;
use tracing::{debug, warn};

use crate::config::Contestant;

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    FirstWins,
    SecondWins,
    Draw,
}

/// 一步棋的记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlyRecord {
    pub player: Player,
    pub row: u8,
    pub col: u8,
    /// 先手方视角的搜索值
    pub value: i32,
    pub moves_considered: u64,
    pub completed: bool,
    pub think_ms: u64,
}

/// 一局的完整记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// 先手方
    pub first: String,
    /// 后手方
    pub second: String,
    pub outcome: Outcome,
    pub plies: Vec<PlyRecord>,
    pub started_at: DateTime<Utc>,
    /// 先手方累计思考时间
    pub first_think_ms: u64,
    /// 后手方累计思考时间
    pub second_think_ms: u64,
}

impl MatchResult {
    /// 胜者名称（和棋为 None）
    pub fn winner(&self) -> Option<&str> {
        match self.outcome {
            Outcome::FirstWins => Some(&self.first),
            Outcome::SecondWins => Some(&self.second),
            Outcome::Draw => None,
        }
    }
}

/// 双方累计思考时间
#[derive(Debug, Default)]
struct ThinkClock {
    first: Duration,
    second: Duration,
}

impl ThinkClock {
    fn charge(&mut self, player: Player, elapsed: Duration) {
        match player {
            Player::One => self.first += elapsed,
            Player::Two => self.second += elapsed,
        }
    }
}

/// 下一整局井字棋，`first` 执先
///
/// `seed_offset` 加到双方的随机种子上，使同一对引擎的多局蒙特卡洛对局互不相同
pub fn play_match(
    first: &Contestant,
    second: &Contestant,
    weights: &Weights,
    seed_offset: u64,
) -> Result<MatchResult> {
    let started_at = Utc::now();
    let mut engines = [
        engine_for(first, weights, seed_offset)?,
        engine_for(second, weights, seed_offset)?,
    ];

    let mut game = TicTacToe::new();
    let mut plies = Vec::new();
    let mut clock = ThinkClock::default();

    loop {
        let last = game.move_list().last_move().cloned();
        if game.done(last.as_ref(), true) {
            break;
        }
        let player = game.next_player();
        let engine = &mut engines[player.index()];

        let started = Instant::now();
        let outcome = engine
            .search(&mut game, last.as_ref())
            .with_context(|| format!("{:?} 搜索失败 (第 {} 步)", player, game.num_moves() + 1))?;
        let elapsed = started.elapsed();
        clock.charge(player, elapsed);
        if !outcome.completed {
            warn!("{:?} 搜索超时，使用目前最佳走法 {}", player, outcome.best_move);
        }

        let to = outcome.best_move.to;
        game.play(to)
            .with_context(|| format!("引擎给出非法走法 {}", to))?;
        debug!("{:?} -> {} (value={})", player, to, outcome.value);

        plies.push(PlyRecord {
            player,
            row: to.row,
            col: to.col,
            value: outcome.value,
            moves_considered: outcome.moves_considered,
            completed: outcome.completed,
            think_ms: elapsed.as_millis() as u64,
        });
    }

    let outcome = match game.winner() {
        Some(Player::One) => Outcome::FirstWins,
        Some(Player::Two) => Outcome::SecondWins,
        None => Outcome::Draw,
    };

    Ok(MatchResult {
        first: first.name.clone(),
        second: second.name.clone(),
        outcome,
        plies,
        started_at,
        first_think_ms: clock.first.as_millis() as u64,
        second_think_ms: clock.second.as_millis() as u64,
    })
}

fn engine_for(
    contestant: &Contestant,
    weights: &Weights,
    seed_offset: u64,
) -> Result<AiEngine<TicTacToe>> {
    let mut options = contestant.search_options();
    options.seed = options.seed.wrapping_add(seed_offset);
    AiEngine::new(options, weights.clone())
        .with_context(|| format!("无法创建引擎 {}", contestant.name))
}
