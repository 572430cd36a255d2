//! 走法与走法列表

use std::ops::Deref;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::player::{Location, Player};

/// 走法（一个 ply）
///
/// `P` 是具体游戏附带的少量数据（例如跳吃路径、墙的方向），落子类游戏使用 `()`。
/// 引擎总以先手方视角生成和回传分值，因此 `value` 与 `inherited_value` 正值对先手方有利。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Move<P = ()> {
    /// 目标位置
    pub to: Location,
    /// 起始位置（落子类游戏为 None）
    pub from: Option<Location>,
    /// 生成走法时的静态评估值
    pub value: i32,
    /// 由子节点回传的评估值
    pub inherited_value: i32,
    /// 走子方
    pub player: Player,
    /// 是否由静态搜索生成的紧急走法
    pub urgent: bool,
    /// 是否为停一手
    pub passing: bool,
    /// 是否位于主要变例上
    pub selected: bool,
    /// 游戏相关数据
    pub payload: P,
}

impl Move<()> {
    /// 创建落子走法
    pub fn new(to: Location, value: i32, player: Player) -> Self {
        Self::with_payload(to, value, player, ())
    }

    /// 创建停一手
    pub fn pass(player: Player) -> Self {
        let mut mv = Self::new(Location::new(0, 0), 0, player);
        mv.passing = true;
        mv
    }
}

impl<P> Move<P> {
    /// 创建带游戏数据的走法
    pub fn with_payload(to: Location, value: i32, player: Player, payload: P) -> Self {
        Self {
            to,
            from: None,
            value,
            inherited_value: value,
            player,
            urgent: false,
            passing: false,
            selected: false,
            payload,
        }
    }

    /// 设置起始位置
    pub fn from_location(mut self, from: Location) -> Self {
        self.from = Some(from);
        self
    }

    /// 标记为紧急走法
    pub fn urgent(mut self) -> Self {
        self.urgent = true;
        self
    }

    /// 走子方视角的静态值
    #[inline]
    pub fn relative_value(&self) -> i32 {
        self.player.sign() * self.value
    }
}

/// 走法比较只看“走了什么”，不看搜索过程中写入的评估和标记
impl<P: PartialEq> PartialEq for Move<P> {
    fn eq(&self, other: &Self) -> bool {
        self.to == other.to
            && self.from == other.from
            && self.player == other.player
            && self.passing == other.passing
            && self.payload == other.payload
    }
}

impl<P: Eq> Eq for Move<P> {}

impl<P> std::fmt::Display for Move<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let who = if self.player.is_player_one() { "P1" } else { "P2" };
        if self.passing {
            return write!(f, "{} pass", who);
        }
        match self.from {
            Some(from) => write!(f, "{} {} -> {}", who, from, self.to)?,
            None => write!(f, "{} {}", who, self.to)?,
        }
        write!(f, " v={} iv={}", self.value, self.inherited_value)
    }
}

/// 走法列表
///
/// 既用作对局历史，也用作搜索中某个节点的候选走法
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveList<P = ()> {
    moves: Vec<Move<P>>,
}

impl<P> Default for MoveList<P> {
    fn default() -> Self {
        Self { moves: Vec::new() }
    }
}

impl<P> MoveList<P> {
    /// 创建空列表
    pub fn new() -> Self {
        Self::default()
    }

    /// 预分配容量
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            moves: Vec::with_capacity(capacity),
        }
    }

    /// 追加走法
    pub fn push(&mut self, mv: Move<P>) {
        self.moves.push(mv);
    }

    /// 移除最后一步
    pub fn pop(&mut self) -> Option<Move<P>> {
        self.moves.pop()
    }

    /// 最后一步
    pub fn last_move(&self) -> Option<&Move<P>> {
        self.moves.last()
    }

    /// 已走步数
    pub fn num_moves(&self) -> usize {
        self.moves.len()
    }

    /// 可变访问
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Move<P>> {
        self.moves.get_mut(index)
    }

    /// 按走子方排序：先手方降序，后手方升序（即对走子方而言从好到差）
    ///
    /// 稳定排序，保证同分走法顺序确定
    pub fn sort_best_first(&mut self, mover: Player) {
        match mover {
            Player::One => self.moves.sort_by(|a, b| b.value.cmp(&a.value)),
            Player::Two => self.moves.sort_by(|a, b| a.value.cmp(&b.value)),
        }
    }

    /// 需要保留的走法数：⌈n·pct/100⌉，不少于 `min_moves`，不少于 1，不超过 n
    pub fn best_count(&self, percentage: u32, min_moves: usize) -> usize {
        let n = self.moves.len();
        if n == 0 {
            return 0;
        }
        let pct = percentage.min(100) as usize;
        let count = (n * pct).div_ceil(100);
        count.max(min_moves).max(1).min(n)
    }

    /// 只保留前 `percentage`% 的走法（列表需已按从好到差排序）
    pub fn retain_best_percentage(&mut self, percentage: u32, min_moves: usize) {
        let keep = self.best_count(percentage, min_moves);
        self.moves.truncate(keep);
    }

    /// 在前 `percentage`% 的走法中随机选择一个
    pub fn random_move_within_percent<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        percentage: u32,
    ) -> Option<&Move<P>> {
        let count = self.best_count(percentage, 1);
        if count == 0 {
            return None;
        }
        self.moves.get(rng.gen_range(0..count))
    }

    /// 转换为 Vec
    pub fn into_vec(self) -> Vec<Move<P>> {
        self.moves
    }
}

impl<P> Deref for MoveList<P> {
    type Target = [Move<P>];

    fn deref(&self) -> &Self::Target {
        &self.moves
    }
}

impl<P> From<Vec<Move<P>>> for MoveList<P> {
    fn from(moves: Vec<Move<P>>) -> Self {
        Self { moves }
    }
}

impl<P> FromIterator<Move<P>> for MoveList<P> {
    fn from_iter<I: IntoIterator<Item = Move<P>>>(iter: I) -> Self {
        Self {
            moves: iter.into_iter().collect(),
        }
    }
}

impl<P> IntoIterator for MoveList<P> {
    type Item = Move<P>;
    type IntoIter = std::vec::IntoIter<Move<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter()
    }
}

impl<'a, P> IntoIterator for &'a MoveList<P> {
    type Item = &'a Move<P>;
    type IntoIter = std::slice::Iter<'a, Move<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn list_of(values: &[i32], player: Player) -> MoveList {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Move::new(Location::new(0, i as u8), v, player))
            .collect()
    }

    #[test]
    fn test_move_equality_ignores_search_state() {
        let a = Move::new(Location::new(1, 1), 5, Player::One);
        let mut b = a.clone();
        b.inherited_value = -300;
        b.selected = true;
        assert_eq!(a, b);

        let c = Move::new(Location::new(1, 1), 5, Player::Two);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sort_best_first() {
        let mut list = list_of(&[3, 9, -4, 9], Player::One);
        list.sort_best_first(Player::One);
        let values: Vec<i32> = list.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![9, 9, 3, -4]);
        // 同分时保持原顺序
        assert_eq!(list[0].to, Location::new(0, 1));

        list.sort_best_first(Player::Two);
        assert_eq!(list[0].value, -4);
    }

    #[test]
    fn test_best_count() {
        let list = list_of(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], Player::One);
        assert_eq!(list.best_count(100, 1), 10);
        assert_eq!(list.best_count(50, 1), 5);
        assert_eq!(list.best_count(15, 1), 2); // 向上取整
        assert_eq!(list.best_count(1, 1), 1);
        assert_eq!(list.best_count(10, 4), 4);
        assert_eq!(list.best_count(10, 40), 10);
        assert_eq!(MoveList::<()>::new().best_count(50, 3), 0);
    }

    #[test]
    fn test_retain_best_percentage_keeps_prefix() {
        let mut list = list_of(&[9, 8, 7, 6], Player::One);
        let full = list.clone();
        list.retain_best_percentage(50, 1);
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|m| full.contains(m)));
        assert_eq!(list[0], full[0]);
    }

    #[test]
    fn test_random_move_within_percent() {
        let list = list_of(&[9, 8, 7, 6, 5, 4, 3, 2, 1, 0], Player::One);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let mv = list.random_move_within_percent(&mut rng, 30).unwrap();
            assert!(mv.value >= 7, "只应从前 30% 中选择: {}", mv);
        }
        assert!(MoveList::<()>::new()
            .random_move_within_percent(&mut rng, 30)
            .is_none());
    }

    #[test]
    fn test_history() {
        let mut history = MoveList::new();
        assert!(history.last_move().is_none());
        history.push(Move::new(Location::new(1, 1), 0, Player::One));
        history.push(Move::new(Location::new(0, 0), 0, Player::Two));
        assert_eq!(history.num_moves(), 2);
        assert_eq!(history.last_move().unwrap().player, Player::Two);
        history.pop();
        assert_eq!(history.last_move().unwrap().player, Player::One);
    }
}
