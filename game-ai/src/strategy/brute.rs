//! 极大极小族策略共用的部分：候选走法生成、静态搜索判定、取消检查

use protocol::{Move, MoveList, Perspective, Searchable, Weights};
use tracing::{error, trace};

use crate::control::SearchControl;
use crate::error::{Result, SearchError};
use crate::options::SearchOptions;
use crate::tree::{PruneType, SearchTreeNode};

/// 节点展开结果
pub(crate) enum Expansion<P> {
    /// 叶子节点，直接评估
    Leaf,
    /// 需要逐个搜索的候选走法（已按走子方从好到差排序）
    Moves(Vec<Move<P>>),
}

/// 递归搜索的返回值
pub(crate) struct Scored<P> {
    pub value: i32,
    pub best: Option<Move<P>>,
}

impl<P> Scored<P> {
    pub fn leaf(value: i32) -> Self {
        Self { value, best: None }
    }
}

/// 一次穷举搜索的上下文
pub(crate) struct BruteContext<'a> {
    pub options: &'a SearchOptions,
    pub weights: &'a Weights,
    pub control: &'a SearchControl,
    pub moves_considered: u64,
    pub percent_done: u32,
    /// 搜索被取消或超时
    pub interrupted: bool,
    look_ahead: i32,
}

impl<'a> BruteContext<'a> {
    pub fn new(options: &'a SearchOptions, weights: &'a Weights, control: &'a SearchControl) -> Self {
        Self {
            options,
            weights,
            control,
            moves_considered: 0,
            percent_done: 0,
            interrupted: false,
            look_ahead: options.brute.look_ahead as i32,
        }
    }

    /// 根节点的剩余深度
    pub fn look_ahead(&self) -> i32 {
        self.look_ahead
    }

    pub fn alpha_beta(&self) -> bool {
        self.options.brute.alpha_beta
    }

    /// 展开下一个兄弟之前检查是否需要停止
    ///
    /// 每个节点的第一个走法总会被搜索，保证总能给出一个最佳走法
    pub fn should_stop(&mut self, index: usize) -> bool {
        if index == 0 {
            return false;
        }
        if !self.interrupted && self.control.should_stop() {
            self.interrupted = true;
        }
        self.interrupted
    }

    /// 根节点每搜完一个走法更新进度
    pub fn update_percent_done(&mut self, depth: i32, searched: usize, total: usize) {
        if depth == self.look_ahead && total > 0 {
            self.percent_done = (100 * searched / total) as u32;
        }
    }

    /// 根节点检查：终局不能搜索
    pub fn check_root<S: Searchable>(
        &self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
    ) -> Result<()> {
        if searchable.done(last_move, false) {
            return Err(SearchError::GameOver {
                moves_played: searchable.num_moves(),
            });
        }
        Ok(())
    }

    /// 展开节点
    ///
    /// 到达名义深度或终局时，若开启静态搜索且局面不稳定，则继续搜索紧急走法，
    /// 最多越过名义深度 `max_quiescent_depth` 层；没有紧急走法时视为叶子。
    pub fn expand<S: Searchable>(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        depth: i32,
    ) -> Result<Expansion<S::Payload>> {
        let done = searchable.done(last_move, false);
        let mover = searchable.player_to_move(last_move);

        if depth <= 0 || done {
            if !self.quiescent(searchable, last_move, depth, done) {
                return Ok(Expansion::Leaf);
            }
            let mut urgent =
                searchable.generate_urgent_moves(last_move, self.weights, Perspective::PlayerOne);
            if urgent.is_empty() {
                return Ok(Expansion::Leaf);
            }
            urgent.sort_best_first(mover);
            trace!("静态搜索 depth={} 紧急走法 {} 个", depth, urgent.len());
            return Ok(Expansion::Moves(urgent.into_vec()));
        }

        let mut moves: MoveList<S::Payload> =
            searchable.generate_moves(last_move, self.weights, Perspective::PlayerOne);
        if moves.is_empty() {
            let moves_played = searchable.num_moves();
            error!("非终局局面没有合法走法 (已走 {} 步)", moves_played);
            return Err(SearchError::NoLegalMoves { moves_played });
        }
        moves.sort_best_first(mover);
        let best = &self.options.best_moves;
        moves.retain_best_percentage(best.percentage_best_moves, best.min_best_moves);
        Ok(Expansion::Moves(moves.into_vec()))
    }

    fn quiescent<S: Searchable>(
        &self,
        searchable: &S,
        last_move: Option<&Move<S::Payload>>,
        depth: i32,
        done: bool,
    ) -> bool {
        let brute = &self.options.brute;
        brute.quiescence
            && depth > -(brute.max_quiescent_depth as i32)
            && !done
            && searchable.in_jeopardy(last_move, self.weights, Perspective::PlayerOne)
    }

    /// 负极大值族的叶子评估：走子方视角
    ///
    /// 调试构建下校验评估函数的对称性
    pub fn relative_worth<S: Searchable>(
        &self,
        searchable: &S,
        last_move: Option<&Move<S::Payload>>,
    ) -> Result<i32> {
        let relative = searchable.worth(last_move, self.weights, Perspective::PlayerToMove);
        if cfg!(debug_assertions) {
            let player = searchable.player_to_move(last_move);
            let absolute = searchable.worth(last_move, self.weights, Perspective::PlayerOne);
            if relative != player.sign() * absolute {
                error!(
                    "评估函数不对称: {:?} 走子, absolute={}, relative={}",
                    player, absolute, relative
                );
                return Err(SearchError::AsymmetricWorth {
                    player,
                    absolute,
                    relative,
                });
            }
        }
        Ok(relative)
    }
}

/// 在父节点下添加子节点（不记录搜索树时返回 None）
pub(crate) fn add_tree_child<'t, P: Clone>(
    tree: Option<&'t mut SearchTreeNode<P>>,
    mv: &Move<P>,
    window: protocol::SearchWindow,
) -> Option<&'t mut SearchTreeNode<P>> {
    tree.map(|t| t.add_child(mv.clone(), window))
}

/// 回填最近添加的子节点的值
pub(crate) fn record_last_child<P>(tree: Option<&mut SearchTreeNode<P>>, value: i32) {
    if let Some(child) = tree.and_then(|t| t.children.last_mut()) {
        child.set_inherited_value(value);
    }
}

/// 搜索完一个节点后：标记主要变例并记录被剪掉的兄弟
pub(crate) fn finish_node<P: Clone>(
    tree: Option<&mut SearchTreeNode<P>>,
    best_index: usize,
    pruned: &[Move<P>],
    value: i32,
    threshold: i32,
    prune: PruneType,
) {
    let Some(tree) = tree else {
        return;
    };
    tree.select_child(best_index);
    if !pruned.is_empty() {
        trace!("剪掉 {} 个兄弟走法: {} vs {}", pruned.len(), value, threshold);
        tree.add_pruned_children(pruned.iter().cloned(), value, threshold, prune);
    }
}

/// 置换表中的深度
#[inline]
pub(crate) fn depth_key(depth: i32) -> u8 {
    depth.clamp(0, u8::MAX as i32) as u8
}

/// 提前搜索记录的最佳走法后，把搜索顺序换算回生成顺序
pub(crate) fn generated_index(position: usize, hint: Option<usize>) -> usize {
    match hint {
        Some(h) if position == 0 => h,
        Some(h) if position <= h => position - 1,
        _ => position,
    }
}
