//! 置换表
//!
//! 用于缓存已搜索过的局面，避免重复计算。
//! 命中只作为提示：只比较键的高 32 位，不同局面碰撞时会读到错误的条目。

use std::sync::atomic::{AtomicU64, Ordering};

use protocol::{HashKey, SearchWindow};

/// 置换表条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// 精确值
    Exact,
    /// 下界（Beta 截断）
    LowerBound,
    /// 上界（没有走法超过 Alpha）
    UpperBound,
}

impl EntryType {
    /// 根据搜索结果与原始窗口判断条目类型
    pub fn classify(value: i32, window: SearchWindow) -> Self {
        if value <= window.alpha {
            EntryType::UpperBound
        } else if value >= window.beta {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        }
    }
}

/// 置换表条目
///
/// 分值以该局面走子方的视角保存
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    /// 哈希键的高 32 位（用于验证）
    pub key: u32,
    /// 评估分数
    pub score: i16,
    /// 搜索深度
    pub depth: u8,
    /// 条目类型
    pub entry_type: EntryType,
    /// 最佳走法在候选列表中的序号（u16::MAX 表示无）
    pub best_index: u16,
    /// 年龄（用于替换策略）
    pub age: u8,
}

impl TTEntry {
    const NO_MOVE: u16 = u16::MAX;

    pub fn new(
        key: u32,
        score: i32,
        depth: u8,
        entry_type: EntryType,
        best_index: Option<usize>,
        age: u8,
    ) -> Self {
        let score = score.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        let best_index = best_index
            .and_then(|i| u16::try_from(i).ok())
            .filter(|&i| i != Self::NO_MOVE)
            .unwrap_or(Self::NO_MOVE);

        Self {
            key,
            score,
            depth,
            entry_type,
            best_index,
            age,
        }
    }

    /// 最佳走法序号
    pub fn best_index(&self) -> Option<usize> {
        (self.best_index != Self::NO_MOVE).then_some(self.best_index as usize)
    }

    pub fn score(&self) -> i32 {
        self.score as i32
    }

    /// 深度足够时，条目能否直接决定本节点的值
    pub fn cutoff(&self, depth: u8, window: SearchWindow) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        let score = self.score();
        match self.entry_type {
            EntryType::Exact => Some(score),
            EntryType::LowerBound if score >= window.beta => Some(score),
            EntryType::UpperBound if score <= window.alpha => Some(score),
            _ => None,
        }
    }
}

/// 置换表
///
/// 使用固定大小的哈希表，按年龄和深度替换
pub struct TranspositionTable {
    /// 条目数组
    entries: Vec<Option<TTEntry>>,
    /// 表大小（条目数）
    size: usize,
    /// 当前年龄
    age: AtomicU64,
    /// 命中次数
    hits: AtomicU64,
    /// 查询次数
    probes: AtomicU64,
}

impl TranspositionTable {
    /// 创建指定大小的置换表
    ///
    /// # Arguments
    /// * `size_mb` - 表大小（MB），至少 1
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let size = ((size_mb.max(1) * 1024 * 1024) / entry_size).max(1);

        Self {
            entries: vec![None; size],
            size,
            age: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            probes: AtomicU64::new(0),
        }
    }

    #[inline]
    fn index(&self, key: HashKey) -> usize {
        (key.value() % self.size as u64) as usize
    }

    #[inline]
    fn verification_key(key: HashKey) -> u32 {
        (key.value() >> 32) as u32
    }

    /// 查询条目
    pub fn probe(&self, key: HashKey) -> Option<TTEntry> {
        self.probes.fetch_add(1, Ordering::Relaxed);

        let entry = self.entries[self.index(key)]?;
        if entry.key == Self::verification_key(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(entry)
        } else {
            None
        }
    }

    /// 存储条目
    pub fn store(
        &mut self,
        key: HashKey,
        score: i32,
        depth: u8,
        entry_type: EntryType,
        best_index: Option<usize>,
    ) {
        let index = self.index(key);
        let age = self.age.load(Ordering::Relaxed) as u8;

        // 空槽直接写入；旧条目来自上一次搜索或深度不大于新条目时替换
        let should_replace = match &self.entries[index] {
            None => true,
            Some(existing) => existing.age != age || depth >= existing.depth,
        };

        if should_replace {
            self.entries[index] = Some(TTEntry::new(
                Self::verification_key(key),
                score,
                depth,
                entry_type,
                best_index,
                age,
            ));
        }
    }

    /// 增加年龄（每次新搜索时调用）
    pub fn new_search(&self) {
        self.age.fetch_add(1, Ordering::Relaxed);
    }

    /// 清空表
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.hits.store(0, Ordering::Relaxed);
        self.probes.store(0, Ordering::Relaxed);
    }

    /// 获取统计信息
    pub fn stats(&self) -> TTStats {
        TTStats {
            entries: self.size,
            used: self.entries.iter().filter(|e| e.is_some()).count(),
            hits: self.hits.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
        }
    }
}

/// 置换表统计信息
#[derive(Debug, Clone)]
pub struct TTStats {
    pub entries: usize,
    pub used: usize,
    pub hits: u64,
    pub probes: u64,
}

impl TTStats {
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }

    pub fn usage(&self) -> f64 {
        self.used as f64 / self.entries as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: HashKey = HashKey(0x1234567890ABCDEF);

    #[test]
    fn test_tt_store_and_probe() {
        let mut tt = TranspositionTable::new(1);
        tt.store(KEY, 100, 5, EntryType::Exact, Some(3));

        let entry = tt.probe(KEY).unwrap();
        assert_eq!(entry.score(), 100);
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.entry_type, EntryType::Exact);
        assert_eq!(entry.best_index(), Some(3));
        assert_eq!(tt.stats().hits, 1);
    }

    #[test]
    fn test_tt_miss() {
        let tt = TranspositionTable::new(1);
        assert!(tt.probe(KEY).is_none());
        assert_eq!(tt.stats().hit_rate(), 0.0);
    }

    #[test]
    fn test_tt_replacement() {
        let mut tt = TranspositionTable::new(1);

        tt.store(KEY, 50, 3, EntryType::Exact, None);
        tt.store(KEY, 100, 5, EntryType::Exact, None);
        let entry = tt.probe(KEY).unwrap();
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.score(), 100);

        // 同一次搜索中较浅的结果不覆盖
        tt.store(KEY, 7, 1, EntryType::Exact, None);
        assert_eq!(tt.probe(KEY).unwrap().score(), 100);

        // 新一次搜索总是覆盖
        tt.new_search();
        tt.store(KEY, 7, 1, EntryType::Exact, None);
        assert_eq!(tt.probe(KEY).unwrap().score(), 7);
    }

    #[test]
    fn test_cutoff_by_bound() {
        let window = SearchWindow::new(-10, 10);
        let exact = TTEntry::new(0, 4, 3, EntryType::Exact, None, 0);
        assert_eq!(exact.cutoff(3, window), Some(4));
        assert_eq!(exact.cutoff(4, window), None, "深度不足不能使用");

        let lower = TTEntry::new(0, 12, 3, EntryType::LowerBound, None, 0);
        assert_eq!(lower.cutoff(2, window), Some(12));
        let lower = TTEntry::new(0, 5, 3, EntryType::LowerBound, None, 0);
        assert_eq!(lower.cutoff(2, window), None);

        let upper = TTEntry::new(0, -10, 3, EntryType::UpperBound, None, 0);
        assert_eq!(upper.cutoff(2, window), Some(-10));
    }

    #[test]
    fn test_classify() {
        let window = SearchWindow::new(0, 10);
        assert_eq!(EntryType::classify(0, window), EntryType::UpperBound);
        assert_eq!(EntryType::classify(5, window), EntryType::Exact);
        assert_eq!(EntryType::classify(10, window), EntryType::LowerBound);
    }

    #[test]
    fn test_best_index_encoding() {
        let entry = TTEntry::new(0, 0, 0, EntryType::Exact, None, 0);
        assert_eq!(entry.best_index(), None);
        let entry = TTEntry::new(0, 0, 0, EntryType::Exact, Some(70_000), 0);
        assert_eq!(entry.best_index(), None);
    }
}
