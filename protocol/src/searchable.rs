//! 可搜索接口
//!
//! 搜索引擎与具体游戏规则之间唯一的耦合点。每个游戏实现一次 [`Searchable`]，
//! 引擎通过它生成走法、走子/撤销、评估局面和判断终局。

use serde::{Deserialize, Serialize};

use crate::moves::{Move, MoveList};
use crate::player::Player;
use crate::zobrist::HashKey;

/// 评估多项式系数
///
/// 引擎只读，不会修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weights(Vec<f64>);

impl Weights {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// 第 i 个系数（越界返回 0）
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        self.0.get(i).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for Weights {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// 评估分值的符号约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Perspective {
    /// 绝对分值：正值对先手方有利
    PlayerOne,
    /// 相对分值：正值对当前走子方有利
    PlayerToMove,
}

impl Perspective {
    /// 把先手方视角的分值换算到本约定下
    #[inline]
    pub fn from_absolute(self, value: i32, to_move: Player) -> i32 {
        match self {
            Perspective::PlayerOne => value,
            Perspective::PlayerToMove => to_move.sign() * value,
        }
    }
}

/// 游戏需要向搜索引擎提供的接口
///
/// 一个实例在同一时刻只被一个搜索独占修改；并发搜索必须使用各自的副本。
/// `last_move` 为 None 表示对局尚未开始。
pub trait Searchable {
    /// 走法携带的游戏相关数据
    type Payload: Clone + PartialEq + std::fmt::Debug;

    /// 生成所有合法应着，按对走子方从好到差排序
    ///
    /// 相同输入必须产生相同结果。非终局时返回空列表属于游戏实现的错误。
    fn generate_moves(
        &self,
        last_move: Option<&Move<Self::Payload>>,
        weights: &Weights,
        perspective: Perspective,
    ) -> MoveList<Self::Payload>;

    /// 生成紧急走法（吃子、叫吃等强制性走法），用于静态搜索
    fn generate_urgent_moves(
        &self,
        last_move: Option<&Move<Self::Payload>>,
        weights: &Weights,
        perspective: Perspective,
    ) -> MoveList<Self::Payload>;

    /// 局面是否处于战术不稳定状态（决定是否进行静态搜索）
    fn in_jeopardy(
        &self,
        last_move: Option<&Move<Self::Payload>>,
        weights: &Weights,
        perspective: Perspective,
    ) -> bool;

    /// 静态评估
    fn worth(
        &self,
        last_move: Option<&Move<Self::Payload>>,
        weights: &Weights,
        perspective: Perspective,
    ) -> i32;

    /// 走子（内部搜索用，不触发界面更新）
    fn make_internal_move(&mut self, mv: &Move<Self::Payload>);

    /// 撤销走子，必须与 `make_internal_move` 成对调用，并逐位还原棋盘和哈希
    fn undo_internal_move(&mut self, mv: &Move<Self::Payload>);

    /// 是否终局；`record_win` 为 true 时记录胜者
    fn done(&mut self, last_move: Option<&Move<Self::Payload>>, record_win: bool) -> bool;

    /// 当前局面的哈希键
    fn hash_key(&self) -> HashKey;

    /// 已走的棋谱
    fn move_list(&self) -> &MoveList<Self::Payload>;

    /// 已走步数
    fn num_moves(&self) -> usize {
        self.move_list().num_moves()
    }

    /// 当前走子方（默认为上一步走子方的对手，开局为先手方）
    fn player_to_move(&self, last_move: Option<&Move<Self::Payload>>) -> Player {
        last_move.map_or(Player::One, |mv| mv.player.opponent())
    }
}
