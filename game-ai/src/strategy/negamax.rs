//! 负极大值搜索
//!
//! 递归内部使用走子方视角的分值，每一层取反；写回走法时换算为先手方视角。
//! 要求评估函数对称：worth(走子方视角) == 走子方符号 × worth(先手方视角)。
//! 带记忆时与负侦察共用同样的置换表用法。

use std::time::Instant;

use protocol::{Move, SearchWindow, Searchable, Weights, INFINITY};
use tracing::{debug, warn};

use super::brute::{
    add_tree_child, depth_key, finish_node, generated_index, record_last_child, BruteContext,
    Expansion, Scored,
};
use super::{SearchOutcome, SearchStrategy};
use crate::control::SearchControl;
use crate::error::{Result, SearchError};
use crate::options::{SearchOptions, SearchStrategyType};
use crate::transposition::{EntryType, TTStats, TranspositionTable};
use crate::tree::{PruneType, SearchTreeNode};

/// 负极大值策略（可选 Alpha-Beta 剪枝）
pub struct NegamaxStrategy {
    options: SearchOptions,
    weights: Weights,
    control: SearchControl,
    tt: Option<TranspositionTable>,
    moves_considered: u64,
    percent_done: u32,
}

impl NegamaxStrategy {
    pub fn new(options: SearchOptions, weights: Weights, control: SearchControl) -> Self {
        Self {
            options,
            weights,
            control,
            tt: None,
            moves_considered: 0,
            percent_done: 0,
        }
    }

    /// 带置换表
    pub fn with_memory(options: SearchOptions, weights: Weights, control: SearchControl) -> Self {
        let tt = TranspositionTable::new(options.tt_size_mb);
        Self {
            tt: Some(tt),
            ..Self::new(options, weights, control)
        }
    }

    pub fn tt_stats(&self) -> Option<TTStats> {
        self.tt.as_ref().map(|tt| tt.stats())
    }
}

impl<S: Searchable> SearchStrategy<S> for NegamaxStrategy {
    fn search(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        mut tree: Option<&mut SearchTreeNode<S::Payload>>,
    ) -> Result<SearchOutcome<S::Payload>> {
        let started = Instant::now();
        if let Some(tt) = &self.tt {
            tt.new_search();
        }
        let mut ctx = BruteContext::new(&self.options, &self.weights, &self.control);
        ctx.check_root(searchable, last_move)?;

        let window = self.options.initial_window();
        if let Some(root) = tree.as_deref_mut() {
            root.clear();
            root.window = window;
        }

        let mover = searchable.player_to_move(last_move);
        let depth = ctx.look_ahead();
        let mut node = Node {
            ctx: &mut ctx,
            tt: self.tt.as_mut(),
        };
        let result = node.search(searchable, last_move, depth, window, tree.as_deref_mut(), true);
        self.moves_considered = ctx.moves_considered;
        self.percent_done = ctx.percent_done;
        let completed = !ctx.interrupted;

        let scored = result?;
        let best_move = scored.best.ok_or(SearchError::NoLegalMoves {
            moves_played: searchable.num_moves(),
        })?;
        let value = mover.sign() * scored.value;
        if let Some(root) = tree {
            root.set_inherited_value(value);
        }
        if !completed {
            warn!("负极大值搜索被中断，返回目前最佳走法");
        }
        if let Some(stats) = self.tt_stats() {
            debug!(
                "置换表: 命中率 {:.1}%, 使用率 {:.1}%",
                stats.hit_rate() * 100.0,
                stats.usage() * 100.0
            );
        }
        debug!(
            "NegaMax: {} value={} moves={} elapsed={:?}",
            best_move,
            value,
            self.moves_considered,
            started.elapsed()
        );

        Ok(SearchOutcome {
            best_move,
            value,
            moves_considered: self.moves_considered,
            completed,
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
        if self.tt.is_some() {
            SearchStrategyType::NegamaxWithMemory
        } else {
            SearchStrategyType::Negamax
        }
    }
}

struct Node<'c, 'a> {
    ctx: &'c mut BruteContext<'a>,
    tt: Option<&'c mut TranspositionTable>,
}

impl Node<'_, '_> {
    /// 返回走子方视角的值
    fn search<S: Searchable>(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        depth: i32,
        mut window: SearchWindow,
        mut tree: Option<&mut SearchTreeNode<S::Payload>>,
        root: bool,
    ) -> Result<Scored<S::Payload>> {
        let mut moves = match self.ctx.expand(searchable, last_move, depth)? {
            Expansion::Leaf => {
                return Ok(Scored::leaf(self.ctx.relative_worth(searchable, last_move)?))
            }
            Expansion::Moves(moves) => moves,
        };

        let key = searchable.hash_key();
        let use_memory = self.tt.is_some() && depth > 0;
        let mut hint = None;
        if use_memory {
            if let Some(entry) = self.tt.as_deref().and_then(|tt| tt.probe(key)) {
                if !root {
                    if let Some(value) = entry.cutoff(depth_key(depth), window) {
                        return Ok(Scored::leaf(value));
                    }
                }
                hint = entry.best_index().filter(|&i| i > 0 && i < moves.len());
            }
        }
        if let Some(h) = hint {
            let mv = moves.remove(h);
            moves.insert(0, mv);
        }

        let sign = searchable.player_to_move(last_move).sign();
        let original = window;
        let total = moves.len();
        let mut best_value = -INFINITY;
        let mut best_index = None;
        let mut cut_at = None;

        for i in 0..total {
            if self.ctx.should_stop(i) {
                break;
            }
            self.ctx.moves_considered += 1;

            let mv = &moves[i];
            let child_window = window.negate_and_swap();
            searchable.make_internal_move(mv);
            let child = add_tree_child(tree.as_deref_mut(), mv, child_window);
            let result = self.search(searchable, Some(mv), depth - 1, child_window, child, false);
            searchable.undo_internal_move(mv);
            let value = -result?.value;

            self.ctx.update_percent_done(depth, i + 1, total);
            if self.ctx.interrupted && best_index.is_some() {
                break;
            }

            moves[i].inherited_value = sign * value;
            record_last_child(tree.as_deref_mut(), sign * value);

            if value > best_value {
                best_value = value;
                best_index = Some(i);
            }

            if self.ctx.alpha_beta() {
                window.alpha = window.alpha.max(value);
                if window.is_empty() {
                    cut_at = Some(i + 1);
                    break;
                }
            }
        }

        let Some(best_index) = best_index else {
            return Err(SearchError::NoLegalMoves {
                moves_played: searchable.num_moves(),
            });
        };

        if use_memory && !self.ctx.interrupted {
            if let Some(tt) = self.tt.as_deref_mut() {
                tt.store(
                    key,
                    best_value,
                    depth_key(depth),
                    EntryType::classify(best_value, original),
                    Some(generated_index(best_index, hint)),
                );
            }
        }

        let pruned = cut_at.map_or(&[][..], |at| &moves[at..]);
        finish_node(tree, best_index, pruned, best_value, window.beta, PruneType::Beta);

        let mut best = moves[best_index].clone();
        best.selected = true;
        Ok(Scored {
            value: best_value,
            best: Some(best),
        })
    }
}
