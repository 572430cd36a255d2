//! 搜索协议常量定义

/// 胜局分值，超过此值视为已分胜负
pub const WINNING_VALUE: i32 = 1000;

/// 搜索窗口的无穷值（必须严格大于任何评估分值）
pub const INFINITY: i32 = 10 * WINNING_VALUE;

/// 静态搜索最多越过名义深度的层数
pub const MAX_QUIESCENT_DEPTH: i32 = 12;

/// 默认前瞻层数
pub const DEFAULT_LOOK_AHEAD: u32 = 2;

/// 默认保留的最佳走法百分比
pub const DEFAULT_PERCENTAGE_BEST_MOVES: u32 = 100;

/// 默认 Zobrist 随机种子
pub const DEFAULT_ZOBRIST_SEED: u64 = 0xDEADBEEF_CAFE_1234;
