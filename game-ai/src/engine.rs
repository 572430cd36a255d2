//! 搜索引擎
//!
//! 按配置创建搜索策略，管理时间限制和取消。
//! 同一个引擎的多次搜索共用一个策略实例（带记忆的策略因此可以复用置换表）。

use protocol::{Move, Searchable, Weights};
use tracing::info;

use crate::control::SearchControl;
use crate::error::Result;
use crate::options::{Difficulty, SearchOptions, SearchStrategyType};
use crate::strategy::{create_strategy, SearchOutcome, SearchStrategy};
use crate::tree::SearchTreeNode;

/// AI 引擎
pub struct AiEngine<S: Searchable> {
    options: SearchOptions,
    control: SearchControl,
    strategy: Box<dyn SearchStrategy<S>>,
}

impl<S> AiEngine<S>
where
    S: Searchable + Clone + Send,
    S::Payload: Send,
{
    /// 创建新的 AI 引擎，非法配置直接拒绝
    pub fn new(options: SearchOptions, weights: Weights) -> Result<Self> {
        let control = SearchControl::with_limit(options.time_limit());
        let strategy = create_strategy(&options, weights, control.clone())?;
        info!(
            "AI 引擎就绪: {} (时间限制 {:?})",
            options.strategy.display_name(),
            options.time_limit()
        );
        Ok(Self {
            options,
            control,
            strategy,
        })
    }

    /// 从难度创建
    pub fn from_difficulty(difficulty: Difficulty, weights: Weights) -> Result<Self> {
        Self::new(SearchOptions::from_difficulty(difficulty), weights)
    }

    /// 搜索最佳走法
    pub fn search(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
    ) -> Result<SearchOutcome<S::Payload>> {
        self.control.restart();
        self.strategy.search(searchable, last_move, None)
    }

    /// 搜索并记录搜索树
    pub fn search_with_tree(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        tree: &mut SearchTreeNode<S::Payload>,
    ) -> Result<SearchOutcome<S::Payload>> {
        self.control.restart();
        self.strategy.search(searchable, last_move, Some(tree))
    }

    /// 取消句柄：在其他线程调用 `stop()` 可让当前搜索尽快返回
    pub fn control(&self) -> SearchControl {
        self.control.clone()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn strategy_type(&self) -> SearchStrategyType {
        self.strategy.strategy_type()
    }

    /// 最近一次搜索考察的走法数
    pub fn moves_considered(&self) -> u64 {
        self.strategy.moves_considered()
    }

    /// 最近一次搜索的进度
    pub fn percent_done(&self) -> u32 {
        self.strategy.percent_done()
    }
}
