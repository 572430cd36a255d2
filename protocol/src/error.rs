//! 错误类型定义

use thiserror::Error;

/// 走子规则错误
///
/// 由具体游戏在玩家（而非搜索引擎）提交走法时返回
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// 无效的位置
    #[error("Invalid location: ({row}, {col})")]
    InvalidLocation { row: u8, col: u8 },

    /// 位置已被占用
    #[error("Location ({row}, {col}) is already occupied")]
    Occupied { row: u8, col: u8 },

    /// 不是该玩家的回合
    #[error("Not your turn")]
    NotYourTurn,

    /// 游戏已结束
    #[error("Game is already over")]
    GameOver,

    /// 没有可悔的棋
    #[error("No move to undo")]
    NothingToUndo,
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, MoveError>;
