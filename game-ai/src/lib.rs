//! 通用双人博弈搜索引擎
//!
//! 包含:
//! - 极大极小 / 负极大值 / 负侦察 + Alpha-Beta 剪枝
//! - 静态搜索（quiescence）与最佳走法百分比筛选
//! - 蒙特卡洛树搜索（UCT），支持多线程根并行
//! - 置换表
//! - 可选的搜索树记录
//!
//! 游戏规则通过 [`protocol::Searchable`] 接入。

mod control;
mod engine;
mod error;
mod options;
pub mod strategy;
mod transposition;
mod tree;

pub use control::SearchControl;
pub use engine::AiEngine;
pub use error::{OptionsError, Result, SearchError};
pub use options::{
    BestMovesSearchOptions, BruteSearchOptions, Difficulty, MonteCarloSearchOptions,
    SearchOptions, SearchStrategyType,
};
pub use protocol::{HashKey, ZobristHash};
pub use strategy::{create_strategy, SearchOutcome, SearchStrategy};
pub use transposition::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use tree::{PruneType, SearchTreeNode};
