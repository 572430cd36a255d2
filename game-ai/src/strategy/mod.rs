//! 搜索策略
//!
//! 所有策略共用同一个入口：给定可搜索的局面和上一步，返回最佳应着。
//! 返回的走法 `inherited_value` 总是先手方视角的分值，并且 `selected` 为 true。

mod brute;
mod minimax;
mod negamax;
mod negascout;
mod rollout;
mod uct;

use std::time::Duration;

use protocol::{Move, Searchable, Weights};
use tracing::debug;

use crate::control::SearchControl;
use crate::error::Result;
use crate::options::{SearchOptions, SearchStrategyType};
use crate::tree::SearchTreeNode;

pub use minimax::MinimaxStrategy;
pub use negamax::NegamaxStrategy;
pub use negascout::NegaScoutStrategy;
pub use uct::MonteCarloStrategy;

/// 一次搜索的结果
#[derive(Debug, Clone)]
pub struct SearchOutcome<P = ()> {
    /// 最佳应着
    pub best_move: Move<P>,
    /// 先手方视角的局面值
    pub value: i32,
    /// 本次搜索考察的走法数
    pub moves_considered: u64,
    /// 是否完整搜索（被取消或超时为 false）
    pub completed: bool,
    /// 耗时
    pub elapsed: Duration,
}

/// 搜索策略接口
pub trait SearchStrategy<S: Searchable> {
    /// 搜索 `last_move` 之后的最佳应着
    ///
    /// `tree` 不为 None 时记录搜索树（原有内容会被清空）
    fn search(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        tree: Option<&mut SearchTreeNode<S::Payload>>,
    ) -> Result<SearchOutcome<S::Payload>>;

    /// 最近一次搜索考察的走法数
    fn moves_considered(&self) -> u64;

    /// 最近一次搜索的大致进度（0-100）
    fn percent_done(&self) -> u32;

    fn strategy_type(&self) -> SearchStrategyType;
}

/// 按配置创建搜索策略
///
/// 配置先经过校验，非法配置在搜索前被拒绝
pub fn create_strategy<S>(
    options: &SearchOptions,
    weights: Weights,
    control: SearchControl,
) -> Result<Box<dyn SearchStrategy<S>>>
where
    S: Searchable + Clone + Send,
    S::Payload: Send,
{
    options.validate()?;
    debug!(
        "创建搜索策略: {}, look_ahead={}, alpha_beta={}, quiescence={}",
        options.strategy.display_name(),
        options.brute.look_ahead,
        options.brute.alpha_beta,
        options.brute.quiescence
    );

    let options = options.clone();
    let strategy: Box<dyn SearchStrategy<S>> = match options.strategy {
        SearchStrategyType::Minimax => Box::new(MinimaxStrategy::new(options, weights, control)),
        SearchStrategyType::Negamax => Box::new(NegamaxStrategy::new(options, weights, control)),
        SearchStrategyType::NegamaxWithMemory => {
            Box::new(NegamaxStrategy::with_memory(options, weights, control))
        }
        SearchStrategyType::NegaScout => {
            Box::new(NegaScoutStrategy::new(options, weights, control))
        }
        SearchStrategyType::NegaScoutWithMemory => {
            Box::new(NegaScoutStrategy::with_memory(options, weights, control))
        }
        SearchStrategyType::MonteCarlo => {
            Box::new(MonteCarloStrategy::new(options, weights, control))
        }
    };
    Ok(strategy)
}
