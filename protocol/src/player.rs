//! 玩家与位置定义

use serde::{Deserialize, Serialize};

/// 玩家
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// 先手方
    One,
    /// 后手方
    Two,
}

impl Player {
    /// 获取对方
    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// 是否为先手方
    pub fn is_player_one(&self) -> bool {
        matches!(self, Player::One)
    }

    /// 从先手方视角换算分值的符号
    #[inline]
    pub fn sign(&self) -> i32 {
        match self {
            Player::One => 1,
            Player::Two => -1,
        }
    }

    /// 转换为数组索引
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

/// 棋盘位置（行、列均从 0 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: u8,
    pub col: u8,
}

impl Location {
    /// 创建位置
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 偏移后的位置（越界返回 None）
    pub fn offset(&self, d_row: i8, d_col: i8, rows: u8, cols: u8) -> Option<Location> {
        let row = self.row as i16 + d_row as i16;
        let col = self.col as i16 + d_col as i16;
        if row >= 0 && row < rows as i16 && col >= 0 && col < cols as i16 {
            Some(Location::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// 在给定列数的棋盘上转换为线性索引
    #[inline]
    pub fn to_index(&self, cols: u8) -> usize {
        self.row as usize * cols as usize + self.col as usize
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
