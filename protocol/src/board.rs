//! 通用矩形棋盘

use serde::{Deserialize, Serialize};

use crate::error::{MoveError, Result};
use crate::player::Location;

/// 矩形棋盘，索引为 row * cols + col
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board<T> {
    rows: u8,
    cols: u8,
    squares: Vec<Option<T>>,
}

impl<T: Copy> Board<T> {
    /// 创建空棋盘
    pub fn empty(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            squares: vec![None; rows as usize * cols as usize],
        }
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// 格子总数
    pub fn num_positions(&self) -> usize {
        self.squares.len()
    }

    /// 位置是否在棋盘内
    #[inline]
    pub fn is_valid(&self, loc: Location) -> bool {
        loc.row < self.rows && loc.col < self.cols
    }

    /// 检查位置合法
    pub fn check(&self, loc: Location) -> Result<()> {
        if self.is_valid(loc) {
            Ok(())
        } else {
            Err(MoveError::InvalidLocation {
                row: loc.row,
                col: loc.col,
            })
        }
    }

    /// 获取指定位置的棋子
    pub fn get(&self, loc: Location) -> Option<T> {
        if self.is_valid(loc) {
            self.squares[loc.to_index(self.cols)]
        } else {
            None
        }
    }

    /// 设置指定位置的棋子，返回原来的棋子
    pub fn set(&mut self, loc: Location, piece: Option<T>) -> Option<T> {
        if self.is_valid(loc) {
            let index = loc.to_index(self.cols);
            std::mem::replace(&mut self.squares[index], piece)
        } else {
            None
        }
    }

    /// 移动棋子（不检查规则），返回被吃的棋子
    pub fn move_piece(&mut self, from: Location, to: Location) -> Option<T> {
        let piece = self.set(from, None);
        self.set(to, piece)
    }

    /// 所有棋子及其位置
    pub fn occupied(&self) -> impl Iterator<Item = (Location, T)> + '_ {
        let cols = self.cols as usize;
        self.squares.iter().enumerate().filter_map(move |(i, sq)| {
            sq.map(|piece| (Location::new((i / cols) as u8, (i % cols) as u8), piece))
        })
    }

    /// 所有空位
    pub fn vacant(&self) -> impl Iterator<Item = Location> + '_ {
        let cols = self.cols as usize;
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, sq)| sq.is_none())
            .map(move |(i, _)| Location::new((i / cols) as u8, (i % cols) as u8))
    }

    /// 棋子数
    pub fn num_occupied(&self) -> usize {
        self.squares.iter().filter(|sq| sq.is_some()).count()
    }

    /// 棋盘是否已满
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|sq| sq.is_some())
    }
}
