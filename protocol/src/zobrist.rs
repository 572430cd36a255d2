//! Zobrist 哈希
//!
//! 用于快速计算局面的哈希值，支持增量更新。
//! 哈希命中只作为缓存提示：不同局面可能碰撞，使用方不得假设键唯一。

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::DEFAULT_ZOBRIST_SEED;
use crate::player::Location;

/// 局面哈希键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HashKey(pub u64);

impl HashKey {
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Zobrist 哈希表
///
/// 为每个 (位置, 状态) 生成独立的随机数；局面键为所有已占用 (位置, 状态) 的异或。
/// 走子时只需异或受影响的格子，撤销时再异或一次即可还原。
#[derive(Debug, Clone)]
pub struct ZobristHash {
    /// 随机数表 [position * num_states + state]
    values: Vec<u64>,
    /// 每个位置的状态数
    num_states: usize,
    /// 走子方切换的哈希值
    side_to_move: u64,
    /// 当前键
    key: HashKey,
}

impl ZobristHash {
    /// 创建新的 Zobrist 表（使用固定种子保证确定性）
    pub fn new(num_positions: usize, num_states: usize) -> Self {
        Self::with_seed(num_positions, num_states, DEFAULT_ZOBRIST_SEED)
    }

    /// 使用指定种子创建
    pub fn with_seed(num_positions: usize, num_states: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let values = (0..num_positions * num_states).map(|_| rng.gen()).collect();

        Self {
            values,
            num_states,
            side_to_move: rng.gen(),
            key: HashKey::default(),
        }
    }

    /// 为棋盘创建哈希表，并按棋盘当前内容初始化键
    pub fn for_board<T, F>(board: &Board<T>, num_states: usize, state_of: F) -> Self
    where
        T: Copy,
        F: Fn(T) -> usize,
    {
        let mut hash = Self::new(board.num_positions(), num_states);
        hash.key = hash.compute_board(board, state_of);
        hash
    }

    /// 位置数
    pub fn num_positions(&self) -> usize {
        self.values.len() / self.num_states.max(1)
    }

    /// 获取 (位置, 状态) 的随机值
    #[inline]
    pub fn value(&self, position: usize, state: usize) -> u64 {
        debug_assert!(state < self.num_states, "状态越界: {}", state);
        self.values[position * self.num_states + state]
    }

    /// 异或进/出一个 (位置, 状态)
    ///
    /// 放子和提子都调用此方法，异或自反保证撤销后键不变
    #[inline]
    pub fn toggle(&mut self, position: usize, state: usize) {
        self.key.0 ^= self.value(position, state);
    }

    /// 在棋盘坐标上异或
    #[inline]
    pub fn toggle_location(&mut self, loc: Location, cols: u8, state: usize) {
        self.toggle(loc.to_index(cols), state);
    }

    /// 把一个格子从 `old_state` 改为 `new_state`
    #[inline]
    pub fn change(&mut self, position: usize, old_state: usize, new_state: usize) {
        self.toggle(position, old_state);
        self.toggle(position, new_state);
    }

    /// 切换走子方
    #[inline]
    pub fn toggle_side(&mut self) {
        self.key.0 ^= self.side_to_move;
    }

    /// 走子方切换的哈希值
    #[inline]
    pub fn side_hash(&self) -> u64 {
        self.side_to_move
    }

    /// 当前键
    #[inline]
    pub fn key(&self) -> HashKey {
        self.key
    }

    /// 重置为空局面
    pub fn reset(&mut self) {
        self.key = HashKey::default();
    }

    /// 按一组 (位置, 状态) 完整计算键
    pub fn compute<I>(&self, cells: I) -> HashKey
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        HashKey(
            cells
                .into_iter()
                .fold(0u64, |acc, (pos, state)| acc ^ self.value(pos, state)),
        )
    }

    /// 按棋盘内容完整计算键
    pub fn compute_board<T, F>(&self, board: &Board<T>, state_of: F) -> HashKey
    where
        T: Copy,
        F: Fn(T) -> usize,
    {
        let cols = board.cols();
        self.compute(
            board
                .occupied()
                .map(|(loc, piece)| (loc.to_index(cols), state_of(piece))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Player;
    use rand::seq::SliceRandom;

    const SIZE: u8 = 19;

    fn black() -> Player {
        Player::One
    }

    fn white() -> Player {
        Player::Two
    }

    /// 按顺序在空棋盘上落子，返回增量维护的键
    fn play(moves: &[(u8, u8, Player)]) -> HashKey {
        let mut hash = ZobristHash::new(SIZE as usize * SIZE as usize, 2);
        for &(row, col, player) in moves {
            hash.toggle_location(Location::new(row, col), SIZE, player.index());
        }
        hash.key()
    }

    #[test]
    fn test_zobrist_deterministic() {
        let table1 = ZobristHash::new(81, 2);
        let table2 = ZobristHash::new(81, 2);
        assert_eq!(table1.value(40, 1), table2.value(40, 1), "Zobrist 哈希应该是确定性的");
        assert_eq!(table1.side_hash(), table2.side_hash());

        let other = ZobristHash::with_seed(81, 2, 42);
        assert_ne!(table1.value(40, 1), other.value(40, 1));
    }

    #[test]
    fn test_empty_board_key_is_zero() {
        let hash = ZobristHash::new(25, 2);
        assert_eq!(hash.key(), HashKey(0));
    }

    #[test]
    fn test_place_and_remove_restores_key() {
        let mut hash = ZobristHash::new(25, 2);
        let loc = Location::new(2, 2);

        hash.toggle_location(loc, 5, black().index());
        assert_ne!(hash.key(), HashKey(0));

        hash.toggle_location(loc, 5, black().index());
        assert_eq!(hash.key(), HashKey(0), "落子再提子后键应回到 0");
    }

    #[test]
    fn test_order_independence() {
        let a = [
            (9, 6, black()),
            (4, 3, white()),
            (7, 3, black()),
            (6, 6, white()),
            (7, 5, black()),
        ];
        let b = [
            (7, 5, black()),
            (6, 6, white()),
            (9, 6, black()),
            (7, 3, black()),
            (4, 3, white()),
        ];
        assert_eq!(play(&a), play(&b), "相同局面不论落子顺序都应有相同的键");
    }

    #[test]
    fn test_order_independence_all_shuffles() {
        let base = vec![
            (1, 3, black()),
            (1, 4, white()),
            (2, 3, black()),
            (2, 4, white()),
            (3, 2, black()),
            (3, 3, black()),
            (3, 4, black()),
            (3, 5, white()),
            (4, 2, white()),
            (4, 4, white()),
            (5, 5, white()),
        ];
        let expected = play(&base);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..30 {
            let mut shuffled = base.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(play(&shuffled), expected);
        }
    }

    #[test]
    fn test_different_positions_differ() {
        let mut with_extra = vec![(1, 3, black()), (1, 4, white())];
        let without = with_extra.clone();
        with_extra.push((1, 1, black()));
        assert_ne!(play(&with_extra), play(&without));

        // 同一位置不同颜色
        assert_ne!(play(&[(4, 4, black())]), play(&[(4, 4, white())]));
    }

    #[test]
    fn test_incremental_matches_full_compute() {
        let mut board = Board::empty(SIZE, SIZE);
        let moves = [(3, 3, black()), (15, 15, white()), (3, 15, black())];
        for &(r, c, p) in &moves {
            board.set(Location::new(r, c), Some(p));
        }
        let full = ZobristHash::for_board(&board, 2, |p: Player| p.index());
        assert_eq!(full.key(), play(&moves));
    }

    #[test]
    fn test_change_and_side() {
        let mut hash = ZobristHash::new(9, 3);
        hash.toggle(4, 0);
        let before = hash.key();
        hash.change(4, 0, 2);
        hash.change(4, 2, 0);
        assert_eq!(hash.key(), before);

        hash.toggle_side();
        assert_ne!(hash.key(), before, "不同走子方应该有不同的哈希值");
        hash.toggle_side();
        assert_eq!(hash.key(), before);
    }
}
