//! 搜索树（调试用）
//!
//! 搜索时可选地传入根节点，引擎把展开过的每个走法、搜索窗口和被剪掉的兄弟记录下来。
//! 不传时不分配任何节点，对搜索结果没有影响。

use std::fmt;

use protocol::{Move, SearchWindow};

/// 剪枝类型：与哪个阈值比较而被剪掉
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneType {
    /// 值不大于 alpha
    Alpha,
    /// 值不小于 beta
    Beta,
}

impl PruneType {
    fn comparison(&self) -> &'static str {
        match self {
            PruneType::Alpha => "<=",
            PruneType::Beta => ">=",
        }
    }
}

/// 搜索树节点
#[derive(Debug, Clone)]
pub struct SearchTreeNode<P = ()> {
    /// 本节点的走法（根节点为 None）
    pub mv: Option<Move<P>>,
    /// 展开时的搜索窗口
    pub window: SearchWindow,
    /// 是否为被剪掉的分支
    pub pruned: bool,
    /// 说明（例如剪枝原因）
    pub comment: Option<String>,
    /// 布局宽度，由 `allocate_space` 计算
    pub space_allocation: u32,
    pub children: Vec<SearchTreeNode<P>>,
}

impl<P> SearchTreeNode<P> {
    /// 以指定走法为根创建
    pub fn new(mv: Option<Move<P>>) -> Self {
        Self {
            mv,
            window: SearchWindow::full(),
            pruned: false,
            comment: None,
            space_allocation: 0,
            children: Vec::new(),
        }
    }

    /// 创建空根节点
    pub fn root() -> Self {
        Self::new(None)
    }

    /// 添加子节点，返回新节点
    pub fn add_child(&mut self, mv: Move<P>, window: SearchWindow) -> &mut SearchTreeNode<P> {
        let mut child = SearchTreeNode::new(Some(mv));
        child.window = window;
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// 记录因剪枝而未展开的兄弟走法
    ///
    /// 注释格式为 `Children pruned because {value} {<=|>=} {threshold}.`
    pub fn add_pruned_children<I>(&mut self, moves: I, value: i32, threshold: i32, prune: PruneType)
    where
        I: IntoIterator<Item = Move<P>>,
    {
        for mv in moves {
            let mut child = SearchTreeNode::new(Some(mv));
            child.pruned = true;
            child.comment = Some(format!(
                "Children pruned because {} {} {}.",
                value,
                prune.comparison(),
                threshold
            ));
            self.children.push(child);
        }
    }

    /// 标记第 `index` 个子节点位于主要变例上
    pub fn select_child(&mut self, index: usize) {
        if let Some(mv) = self.children.get_mut(index).and_then(|c| c.mv.as_mut()) {
            mv.selected = true;
        }
    }

    /// 回填本节点走法的回传值
    pub fn set_inherited_value(&mut self, value: i32) {
        if let Some(mv) = self.mv.as_mut() {
            mv.inherited_value = value;
        }
    }

    /// 引擎预期的下一步（第一个被选中的子节点）
    pub fn expected_next_node(&self) -> Option<&SearchTreeNode<P>> {
        self.children
            .iter()
            .find(|c| c.mv.as_ref().is_some_and(|m| m.selected))
    }

    /// 从本节点开始沿被选中的子节点走下去得到的走法序列
    pub fn principal_variation(&self) -> Vec<&Move<P>> {
        let mut line = Vec::new();
        let mut node = self.expected_next_node();
        while let Some(n) = node {
            if let Some(mv) = n.mv.as_ref() {
                line.push(mv);
            }
            node = n.expected_next_node();
        }
        line
    }

    /// 子节点的走法
    pub fn child_moves(&self) -> Vec<&Move<P>> {
        self.children.iter().filter_map(|c| c.mv.as_ref()).collect()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// 后代节点总数（不含自身）
    pub fn num_descendants(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.num_descendants())
            .sum()
    }

    /// 按子树大小分配布局宽度
    ///
    /// 本节点得到 `total`，子节点按 (1 + 后代数) 的比例瓜分，至少为 1
    pub fn allocate_space(&mut self, total: u32) {
        self.space_allocation = total;
        let sizes: Vec<usize> = self.children.iter().map(|c| 1 + c.num_descendants()).collect();
        let sum: usize = sizes.iter().sum();
        if sum == 0 {
            return;
        }
        for (child, size) in self.children.iter_mut().zip(sizes) {
            let share = (total as u64 * size as u64 / sum as u64).max(1) as u32;
            child.allocate_space(share);
        }
    }

    /// 清空子树
    pub fn clear(&mut self) {
        self.children.clear();
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:width$}", "", width = indent * 2)?;
        match &self.mv {
            Some(mv) => write!(f, "{}", mv)?,
            None => write!(f, "root")?,
        }
        if self.pruned {
            write!(f, " *PRUNED*")?;
        } else {
            write!(f, " a={} b={}", self.window.alpha, self.window.beta)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " ({})", comment)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.fmt_indented(f, indent + 1)?;
        }
        Ok(())
    }
}

impl<P> Default for SearchTreeNode<P> {
    fn default() -> Self {
        Self::root()
    }
}

impl<P> fmt::Display for SearchTreeNode<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Location, Player};

    fn mv(col: u8, player: Player) -> Move {
        Move::new(Location::new(0, col), 0, player)
    }

    fn sample_tree() -> SearchTreeNode {
        let mut root = SearchTreeNode::root();
        let first = root.add_child(mv(0, Player::One), SearchWindow::full());
        first.add_child(mv(1, Player::Two), SearchWindow::new(-5, 5));
        first.add_child(mv(2, Player::Two), SearchWindow::new(-5, 5));
        first.select_child(1);
        root.add_child(mv(3, Player::One), SearchWindow::full());
        root.add_pruned_children(vec![mv(4, Player::One)], 12, 8, PruneType::Beta);
        root.select_child(0);
        root
    }

    #[test]
    fn test_add_pruned_children_comment() {
        let root = sample_tree();
        let pruned = &root.children[2];
        assert!(pruned.pruned);
        assert_eq!(pruned.comment.as_deref(), Some("Children pruned because 12 >= 8."));

        let mut node = SearchTreeNode::root();
        node.add_pruned_children(vec![mv(0, Player::Two)], -3, 1, PruneType::Alpha);
        assert_eq!(
            node.children[0].comment.as_deref(),
            Some("Children pruned because -3 <= 1.")
        );
    }

    #[test]
    fn test_expected_next_and_principal_variation() {
        let root = sample_tree();
        let next = root.expected_next_node().unwrap();
        assert_eq!(next.mv.as_ref().unwrap().to, Location::new(0, 0));

        let pv: Vec<Location> = root.principal_variation().iter().map(|m| m.to).collect();
        assert_eq!(pv, vec![Location::new(0, 0), Location::new(0, 2)]);
    }

    #[test]
    fn test_counts() {
        let root = sample_tree();
        assert_eq!(root.num_children(), 3);
        assert_eq!(root.child_moves().len(), 3);
        assert_eq!(root.num_descendants(), 5);
        assert_eq!(SearchTreeNode::<()>::root().num_descendants(), 0);
    }

    #[test]
    fn test_allocate_space_proportional() {
        let mut root = sample_tree();
        root.allocate_space(500);
        assert_eq!(root.space_allocation, 500);
        // 子树大小 3 : 1 : 1
        assert_eq!(root.children[0].space_allocation, 300);
        assert_eq!(root.children[1].space_allocation, 100);
        assert_eq!(root.children[0].children[0].space_allocation, 150);
    }

    #[test]
    fn test_display_dump() {
        let root = sample_tree();
        let text = root.to_string();
        assert!(text.starts_with("root a=-10000 b=10000"));
        assert!(text.contains("*PRUNED*"));
        assert_eq!(text.lines().count(), 6);
    }
}
