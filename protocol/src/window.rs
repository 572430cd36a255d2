//! 搜索窗口

use serde::{Deserialize, Serialize};

use crate::constants::INFINITY;

/// Alpha-Beta 搜索窗口
///
/// 值语义：每次递归调用创建新窗口，兄弟分支之间不共享
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub alpha: i32,
    pub beta: i32,
}

impl SearchWindow {
    pub const fn new(alpha: i32, beta: i32) -> Self {
        Self { alpha, beta }
    }

    /// 初始全窗口
    pub const fn full() -> Self {
        Self::new(-INFINITY, INFINITY)
    }

    /// 取反并交换（负极大值递归时使用）
    #[inline]
    pub fn negate_and_swap(&self) -> Self {
        Self::new(-self.beta, -self.alpha)
    }

    /// alpha >= beta 时窗口为空，必须立即剪枝
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alpha >= self.beta
    }

    /// 值是否严格落在窗口内
    #[inline]
    pub fn contains(&self, value: i32) -> bool {
        value > self.alpha && value < self.beta
    }
}

impl Default for SearchWindow {
    fn default() -> Self {
        Self::full()
    }
}

impl std::fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.alpha, self.beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negate_and_swap() {
        let window = SearchWindow::new(-5, 20);
        assert_eq!(window.negate_and_swap(), SearchWindow::new(-20, 5));
        assert_eq!(window.negate_and_swap().negate_and_swap(), window);
    }

    #[test]
    fn test_empty_window() {
        assert!(!SearchWindow::full().is_empty());
        assert!(SearchWindow::new(3, 3).is_empty());
        assert!(SearchWindow::new(4, 3).is_empty());
    }

    #[test]
    fn test_contains() {
        let window = SearchWindow::new(0, 10);
        assert!(window.contains(5));
        assert!(!window.contains(0));
        assert!(!window.contains(10));
    }
}
