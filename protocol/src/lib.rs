//! 双人博弈搜索共享协议库
//!
//! 包含:
//! - 走法、走法列表、位置、玩家等核心数据结构
//! - 搜索引擎与游戏规则之间的 Searchable 接口
//! - Zobrist 增量哈希
//! - 通用棋盘与悔棋记录栈

mod board;
mod constants;
mod error;
mod moves;
mod player;
mod searchable;
mod undo;
mod window;
mod zobrist;

pub use board::Board;
pub use constants::*;
pub use error::{MoveError, Result};
pub use moves::{Move, MoveList};
pub use player::{Location, Player};
pub use searchable::{Perspective, Searchable, Weights};
pub use undo::UndoStack;
pub use window::SearchWindow;
pub use zobrist::{HashKey, ZobristHash};
