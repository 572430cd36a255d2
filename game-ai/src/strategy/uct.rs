//! 蒙特卡洛树搜索（UCT）
//!
//! 每次模拟从根节点出发，按 UCT 值选择子节点下降，
//! 到达未访问过的节点后在局面副本上进行一局半随机对局，再把结果沿路径回传。
//! 胜记 1 分，和棋记 0.5 分，记在走出该节点走法的一方名下。
//! 最终选择访问次数最多的子节点。

use std::time::Instant;

use protocol::{Move, Perspective, SearchWindow, Searchable, Weights, WINNING_VALUE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, warn};

use super::rollout::{outcome_score, parallel_search, random_game};
use super::{SearchOutcome, SearchStrategy};
use crate::control::SearchControl;
use crate::error::{Result, SearchError};
use crate::options::{SearchOptions, SearchStrategyType};
use crate::tree::SearchTreeNode;

/// UCT 树节点
#[derive(Debug, Clone)]
pub(crate) struct UctNode<P> {
    pub mv: Option<Move<P>>,
    pub visits: u32,
    /// 走出本节点走法的一方的得分
    pub wins: f64,
    pub children: Vec<UctNode<P>>,
    expanded: bool,
}

impl<P> UctNode<P> {
    pub fn new(mv: Option<Move<P>>) -> Self {
        Self {
            mv,
            visits: 0,
            wins: 0.0,
            children: Vec::new(),
            expanded: false,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / self.visits as f64
        }
    }

    /// win_rate + ratio·√(ln(父节点访问数)/访问数)
    ///
    /// 未访问的子节点为正无穷，任何子节点被再次访问之前所有兄弟都至少访问一次
    pub fn uct_value(&self, explore_exploit_ratio: f64, parent_visits: u32) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let exploration = ((parent_visits.max(1) as f64).ln() / self.visits as f64).sqrt();
        self.win_rate() + explore_exploit_ratio * exploration
    }

    /// 记录一次模拟结果（`score` 为先手方得分）
    pub fn record(&mut self, score: f64) {
        self.visits += 1;
        self.wins += match &self.mv {
            Some(mv) if mv.player.is_player_one() => score,
            Some(_) => 1.0 - score,
            None => 0.0,
        };
    }

    /// UCT 值最大的子节点，同值取第一个
    pub fn select_child(&self, explore_exploit_ratio: f64) -> Option<usize> {
        let mut best = None;
        let mut best_value = f64::NEG_INFINITY;
        for (i, child) in self.children.iter().enumerate() {
            let value = child.uct_value(explore_exploit_ratio, self.visits);
            if value > best_value {
                best_value = value;
                best = Some(i);
            }
        }
        best
    }

    /// 访问次数最多的子节点，同值取第一个
    pub fn most_visited(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (i, child) in self.children.iter().enumerate() {
            match best {
                Some((_, visits)) if child.visits <= visits => {}
                _ => best = Some((i, child.visits)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// 换算成先手方视角的分值：胜率 1 对应 WINNING_VALUE，0 对应 -WINNING_VALUE
    pub fn absolute_value(&self) -> i32 {
        if self.visits == 0 {
            return 0;
        }
        let rate = match &self.mv {
            Some(mv) if !mv.player.is_player_one() => 1.0 - self.win_rate(),
            _ => self.win_rate(),
        };
        ((2.0 * rate - 1.0) * WINNING_VALUE as f64).round() as i32
    }

    /// 合并另一棵树根节点下的统计（子节点按序号对应）
    pub fn merge_root(&mut self, other: &UctNode<P>) {
        self.visits += other.visits;
        self.wins += other.wins;
        for (mine, theirs) in self.children.iter_mut().zip(&other.children) {
            mine.visits += theirs.visits;
            mine.wins += theirs.wins;
        }
    }
}

/// 一棵 UCT 树上的模拟过程
pub(crate) struct UctSearch<'a> {
    options: &'a SearchOptions,
    weights: &'a Weights,
    control: &'a SearchControl,
    rng: ChaCha8Rng,
    pub moves_considered: u64,
    pub simulations: u32,
    pub interrupted: bool,
}

impl<'a> UctSearch<'a> {
    pub fn new(
        options: &'a SearchOptions,
        weights: &'a Weights,
        control: &'a SearchControl,
        seed: u64,
    ) -> Self {
        Self {
            options,
            weights,
            control,
            rng: ChaCha8Rng::seed_from_u64(seed),
            moves_considered: 0,
            simulations: 0,
            interrupted: false,
        }
    }

    /// 进行至多 `max_simulations` 次模拟，返回根节点
    pub fn run<S>(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        max_simulations: u32,
    ) -> Result<UctNode<S::Payload>>
    where
        S: Searchable + Clone,
    {
        let mut root = UctNode::new(last_move.cloned());
        self.expand(searchable, &mut root)?;

        while self.simulations < max_simulations {
            if self.simulations > 0 && self.control.should_stop() {
                self.interrupted = true;
                break;
            }
            self.simulate(searchable, &mut root)?;
            self.simulations += 1;
        }
        Ok(root)
    }

    fn expand<S: Searchable>(&mut self, searchable: &mut S, node: &mut UctNode<S::Payload>) -> Result<()> {
        let last = node.mv.as_ref();
        let mut moves = searchable.generate_moves(last, self.weights, Perspective::PlayerOne);
        if moves.is_empty() {
            let moves_played = searchable.num_moves();
            error!("非终局局面没有合法走法 (已走 {} 步)", moves_played);
            return Err(SearchError::NoLegalMoves { moves_played });
        }
        moves.sort_best_first(searchable.player_to_move(last));
        let best = &self.options.best_moves;
        moves.retain_best_percentage(best.percentage_best_moves, best.min_best_moves);

        node.children = moves.into_iter().map(|mv| UctNode::new(Some(mv))).collect();
        node.expanded = true;
        Ok(())
    }

    /// 一次模拟，返回先手方得分
    fn simulate<S>(&mut self, searchable: &mut S, node: &mut UctNode<S::Payload>) -> Result<f64>
    where
        S: Searchable + Clone,
    {
        let score = if node.visits == 0 && !node.expanded {
            let (score, plies) = random_game(
                searchable,
                node.mv.as_ref(),
                self.options,
                self.weights,
                &mut self.rng,
            )?;
            self.moves_considered += plies;
            score
        } else if searchable.done(node.mv.as_ref(), false) {
            outcome_score(searchable.worth(node.mv.as_ref(), self.weights, Perspective::PlayerOne))
        } else {
            if !node.expanded {
                self.expand(searchable, node)?;
            }
            let ratio = self.options.monte_carlo.explore_exploit_ratio;
            let index = node.select_child(ratio).ok_or(SearchError::NoLegalMoves {
                moves_played: searchable.num_moves(),
            })?;
            let child = &mut node.children[index];
            let Some(mv) = child.mv.clone() else {
                return Err(SearchError::NoLegalMoves {
                    moves_played: searchable.num_moves(),
                });
            };

            self.moves_considered += 1;
            searchable.make_internal_move(&mv);
            let result = self.simulate(searchable, child);
            searchable.undo_internal_move(&mv);
            result?
        };

        node.record(score);
        Ok(score)
    }
}

/// 蒙特卡洛策略
pub struct MonteCarloStrategy {
    options: SearchOptions,
    weights: Weights,
    control: SearchControl,
    moves_considered: u64,
    percent_done: u32,
}

impl MonteCarloStrategy {
    pub fn new(options: SearchOptions, weights: Weights, control: SearchControl) -> Self {
        Self {
            options,
            weights,
            control,
            moves_considered: 0,
            percent_done: 0,
        }
    }
}

impl<S> SearchStrategy<S> for MonteCarloStrategy
where
    S: Searchable + Clone + Send,
    S::Payload: Send,
{
    fn search(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        tree: Option<&mut SearchTreeNode<S::Payload>>,
    ) -> Result<SearchOutcome<S::Payload>> {
        let started = Instant::now();
        if searchable.done(last_move, false) {
            return Err(SearchError::GameOver {
                moves_played: searchable.num_moves(),
            });
        }

        let mc = &self.options.monte_carlo;
        let (root, simulations, moves_considered, interrupted) = if mc.num_threads <= 1 {
            let mut uct = UctSearch::new(&self.options, &self.weights, &self.control, self.options.seed);
            let root = uct.run(searchable, last_move, mc.max_simulations)?;
            (root, uct.simulations, uct.moves_considered, uct.interrupted)
        } else {
            let pooled = parallel_search(searchable, last_move, &self.options, &self.weights, &self.control)?;
            (pooled.root, pooled.simulations, pooled.moves_considered, pooled.interrupted)
        };
        self.moves_considered = moves_considered;
        self.percent_done = (100 * simulations as u64 / mc.max_simulations as u64) as u32;

        let best_index = root.most_visited().ok_or(SearchError::NoLegalMoves {
            moves_played: searchable.num_moves(),
        })?;
        let best_node = &root.children[best_index];
        let value = best_node.absolute_value();
        let mut best_move = best_node.mv.clone().ok_or(SearchError::NoLegalMoves {
            moves_played: searchable.num_moves(),
        })?;
        best_move.inherited_value = value;
        best_move.selected = true;

        if let Some(tree) = tree {
            tree.clear();
            tree.window = SearchWindow::full();
            tree.set_inherited_value(value);
            export_tree(&root, tree);
        }

        if interrupted {
            warn!("蒙特卡洛搜索被中断，已完成 {} 次模拟", simulations);
        }
        debug!(
            "UCT: {} visits={} value={} simulations={} elapsed={:?}",
            best_move,
            best_node.visits,
            value,
            simulations,
            started.elapsed()
        );

        Ok(SearchOutcome {
            best_move,
            value,
            moves_considered,
            completed: !interrupted,
            elapsed: started.elapsed(),
        })
    }

    fn moves_considered(&self) -> u64 {
        self.moves_considered
    }

    fn percent_done(&self) -> u32 {
        self.percent_done
    }

    fn strategy_type(&self) -> SearchStrategyType {
        SearchStrategyType::MonteCarlo
    }
}

/// 把 UCT 树转成搜索树，访问最多的路径标记为选中
fn export_tree<P: Clone>(node: &UctNode<P>, tree: &mut SearchTreeNode<P>) {
    for child in &node.children {
        let Some(mv) = child.mv.as_ref() else {
            continue;
        };
        let mut mv = mv.clone();
        mv.inherited_value = child.absolute_value();
        let added = tree.add_child(mv, SearchWindow::full());
        added.comment = Some(format!("visits={}, wins={:.1}", child.visits, child.wins));
        export_tree(child, added);
    }
    if let Some(best) = node.most_visited() {
        tree.select_child(best);
    }
}
