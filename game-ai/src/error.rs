//! 错误类型定义

use protocol::Player;
use thiserror::Error;

/// 搜索配置错误（在搜索开始前拒绝）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
    /// 前瞻层数过小
    #[error("Look ahead must be at least 1, got {0}")]
    LookAhead(u32),

    /// 最佳走法百分比越界
    #[error("Percentage of best moves must be in (0, 100], got {0}")]
    PercentageBestMoves(u32),

    /// 随机对局的选择阈值越界
    #[error("Percent less than best threshold must be in (0, 100], got {0}")]
    PercentLessThanBestThresh(u32),

    /// 模拟次数为 0
    #[error("Max simulations must be positive")]
    MaxSimulations,

    /// 探索/利用比例无效
    #[error("Explore/exploit ratio must be a non-negative number, got {0}")]
    ExploreExploitRatio(f64),

    /// 随机对局长度为 0
    #[error("Random look ahead must be at least 1")]
    RandomLookAhead,

    /// 线程数为 0
    #[error("Number of rollout threads must be at least 1")]
    NumThreads,

    /// 置换表大小为 0
    #[error("Transposition table size must be at least 1 MB")]
    TableSize,
}

/// 搜索错误
///
/// 除配置错误和终局外，均表示具体游戏的 Searchable 实现违反了接口约定
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// 非终局却没有任何走法
    #[error("No legal move found on a non-terminal position (after {moves_played} moves)")]
    NoLegalMoves { moves_played: usize },

    /// 对已终局的局面请求搜索
    #[error("Cannot search a finished game (after {moves_played} moves)")]
    GameOver { moves_played: usize },

    /// 负极大值搜索要求评估函数对称
    #[error("worth() is not symmetric for {player:?} to move: absolute {absolute}, relative {relative}")]
    AsymmetricWorth {
        player: Player,
        absolute: i32,
        relative: i32,
    },

    /// 配置错误
    #[error("Invalid search options: {0}")]
    InvalidOptions(#[from] OptionsError),
}

/// 搜索结果类型
pub type Result<T> = std::result::Result<T, SearchError>;
