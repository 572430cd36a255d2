//! 随机对局与根并行模拟
//!
//! 随机对局总在局面副本上进行，不影响搜索中的局面。
//! 多线程时每个线程持有自己的局面副本和随机数种子（seed + 线程号），
//! 各自建树，结束后按根节点子节点序号合并一次统计。

use protocol::{Move, Perspective, Searchable, Weights};
use rand::Rng;
use tracing::{debug, error};

use super::uct::{UctNode, UctSearch};
use crate::control::SearchControl;
use crate::error::{Result, SearchError};
use crate::options::SearchOptions;

/// 终局评估换算为先手方得分：胜 1，负 0，和 0.5
pub(crate) fn outcome_score(worth: i32) -> f64 {
    match worth.signum() {
        1 => 1.0,
        -1 => 0.0,
        _ => 0.5,
    }
}

/// 从当前局面开始下一局半随机对局
///
/// 每步只在最好的 `percent_less_than_best_thresh`% 走法中随机选择，
/// 最多走 `random_look_ahead` 步。返回先手方得分和走的步数。
pub(crate) fn random_game<S, R>(
    start: &S,
    last_move: Option<&Move<S::Payload>>,
    options: &SearchOptions,
    weights: &Weights,
    rng: &mut R,
) -> Result<(f64, u64)>
where
    S: Searchable + Clone,
    R: Rng + ?Sized,
{
    let mut board = start.clone();
    let mut last = last_move.cloned();
    let mut plies = 0u64;
    let threshold = options.best_moves.percent_less_than_best_thresh;

    while plies < options.monte_carlo.random_look_ahead as u64 {
        if board.done(last.as_ref(), false) {
            break;
        }
        let mut moves = board.generate_moves(last.as_ref(), weights, Perspective::PlayerOne);
        if moves.is_empty() {
            let moves_played = board.num_moves();
            error!("随机对局中非终局局面没有合法走法 (已走 {} 步)", moves_played);
            return Err(SearchError::NoLegalMoves { moves_played });
        }
        moves.sort_best_first(board.player_to_move(last.as_ref()));
        let Some(mv) = moves.random_move_within_percent(rng, threshold).cloned() else {
            break;
        };
        board.make_internal_move(&mv);
        last = Some(mv);
        plies += 1;
    }

    let worth = board.worth(last.as_ref(), weights, Perspective::PlayerOne);
    Ok((outcome_score(worth), plies))
}

/// 多线程模拟的合并结果
pub(crate) struct PooledSearch<P> {
    pub root: UctNode<P>,
    pub simulations: u32,
    pub moves_considered: u64,
    pub interrupted: bool,
}

/// 第 `worker` 个线程分到的模拟次数
fn share_of(total: u32, workers: usize, worker: usize) -> u32 {
    let workers = workers as u32;
    let worker = worker as u32;
    total / workers + u32::from(worker < total % workers)
}

/// 根并行：`num_threads` 个线程各自在局面副本上模拟，最后合并根节点统计
pub(crate) fn parallel_search<S>(
    searchable: &S,
    last_move: Option<&Move<S::Payload>>,
    options: &SearchOptions,
    weights: &Weights,
    control: &SearchControl,
) -> Result<PooledSearch<S::Payload>>
where
    S: Searchable + Clone + Send,
    S::Payload: Send,
{
    let mc = &options.monte_carlo;
    let workers = mc.num_threads.max(1);

    let results: Vec<Result<(UctNode<S::Payload>, UctStats)>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let mut board = searchable.clone();
                let last = last_move.cloned();
                let simulations = share_of(mc.max_simulations, workers, worker);
                let seed = options.seed.wrapping_add(worker as u64);
                s.spawn(move || -> Result<(UctNode<S::Payload>, UctStats)> {
                    let mut uct = UctSearch::new(options, weights, control, seed);
                    let root = uct.run(&mut board, last.as_ref(), simulations)?;
                    Ok((
                        root,
                        UctStats {
                            simulations: uct.simulations,
                            moves_considered: uct.moves_considered,
                            interrupted: uct.interrupted,
                        },
                    ))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    let mut merged: Option<PooledSearch<S::Payload>> = None;
    for result in results {
        let (root, stats) = result?;
        match merged.as_mut() {
            None => {
                merged = Some(PooledSearch {
                    root,
                    simulations: stats.simulations,
                    moves_considered: stats.moves_considered,
                    interrupted: stats.interrupted,
                })
            }
            Some(pooled) => {
                pooled.root.merge_root(&root);
                pooled.simulations += stats.simulations;
                pooled.moves_considered += stats.moves_considered;
                pooled.interrupted |= stats.interrupted;
            }
        }
    }

    let pooled = merged.ok_or(SearchError::NoLegalMoves {
        moves_played: searchable.num_moves(),
    })?;
    debug!("{} 个线程共完成 {} 次模拟", workers, pooled.simulations);
    Ok(pooled)
}

struct UctStats {
    simulations: u32,
    moves_considered: u64,
    interrupted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_score() {
        assert_eq!(outcome_score(250), 1.0);
        assert_eq!(outcome_score(-3), 0.0);
        assert_eq!(outcome_score(0), 0.5);
    }

    #[test]
    fn test_share_of_covers_total() {
        for (total, workers) in [(1000, 3), (7, 4), (2, 5), (12, 1)] {
            let sum: u32 = (0..workers).map(|w| share_of(total, workers, w)).sum();
            assert_eq!(sum, total);
        }
        assert_eq!(share_of(7, 4, 0), 2);
        assert_eq!(share_of(7, 4, 3), 1);
    }
}
