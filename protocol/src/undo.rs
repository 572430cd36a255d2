//! 悔棋记录栈
//!
//! 每次走子压入一条撤销记录，撤销时按相反顺序弹出，使走子/撤销成对且可单独测试

use crate::error::{MoveError, Result};

/// 撤销记录栈
#[derive(Debug, Clone)]
pub struct UndoStack<R> {
    records: Vec<R>,
}

impl<R> UndoStack<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// 记录一次走子
    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    /// 取出最近一次走子的记录
    pub fn pop(&mut self) -> Result<R> {
        self.records.pop().ok_or(MoveError::NothingToUndo)
    }

    /// 最近一次走子的记录
    pub fn peek(&self) -> Option<&R> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<R> Default for UndoStack<R> {
    fn default() -> Self {
        Self::new()
    }
}
