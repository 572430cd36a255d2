//! 负侦察（主要变例搜索）
//!
//! 第一个走法用完整窗口搜索，其余走法先用零窗口试探，
//! 试探结果落在窗口内时再用完整窗口重搜。
//! 带记忆时使用置换表：非根节点命中且深度足够可直接返回，记录的最佳走法优先搜索。

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

/// 负侦察策略
pub struct NegaScoutStrategy {
    options: SearchOptions,
    weights: Weights,
    control: SearchControl,
    tt: Option<TranspositionTable>,
    moves_considered: u64,
    percent_done: u32,
}

impl NegaScoutStrategy {
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

    /// 置换表统计
    pub fn tt_stats(&self) -> Option<TTStats> {
        self.tt.as_ref().map(|tt| tt.stats())
    }
}

impl<S: Searchable> SearchStrategy<S> for NegaScoutStrategy {
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

        let mut scout = Scout {
            ctx: BruteContext::new(&self.options, &self.weights, &self.control),
            tt: self.tt.as_mut(),
        };
        scout.ctx.check_root(searchable, last_move)?;

        let window = self.options.initial_window();
        if let Some(root) = tree.as_deref_mut() {
            root.clear();
            root.window = window;
        }

        let mover = searchable.player_to_move(last_move);
        let depth = scout.ctx.look_ahead();
        let result = scout.search_node(searchable, last_move, depth, window, tree.as_deref_mut(), true);
        self.moves_considered = scout.ctx.moves_considered;
        self.percent_done = scout.ctx.percent_done;
        let completed = !scout.ctx.interrupted;

        let scored = result?;
        let best_move = scored.best.ok_or(SearchError::NoLegalMoves {
            moves_played: searchable.num_moves(),
        })?;
        let value = mover.sign() * scored.value;
        if let Some(root) = tree {
            root.set_inherited_value(value);
        }
        if !completed {
            warn!("负侦察搜索被中断，返回目前最佳走法");
        }
        if let Some(stats) = self.tt_stats() {
            debug!(
                "置换表: 命中率 {:.1}%, 使用率 {:.1}%",
                stats.hit_rate() * 100.0,
                stats.usage() * 100.0
            );
        }
        debug!(
            "NegaScout: {} value={} moves={} elapsed={:?}",
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
            SearchStrategyType::NegaScoutWithMemory
        } else {
            SearchStrategyType::NegaScout
        }
    }
}

struct Scout<'a> {
    ctx: BruteContext<'a>,
    tt: Option<&'a mut TranspositionTable>,
}

impl Scout<'_> {
    /// 返回走子方视角的值
    fn search_node<S: Searchable>(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        depth: i32,
        window: SearchWindow,
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
        let mut window = window;
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
            let scout = i > 0;
            let probe_window = if scout {
                SearchWindow::new(-window.alpha - 1, -window.alpha)
            } else {
                window.negate_and_swap()
            };

            searchable.make_internal_move(mv);
            let child = add_tree_child(tree.as_deref_mut(), mv, probe_window);
            let mut result = self
                .search_node(searchable, Some(mv), depth - 1, probe_window, child, false)
                .map(|r| -r.value);
            if let Ok(value) = result {
                if scout && value > window.alpha && value < window.beta && !self.ctx.interrupted {
                    let full = window.negate_and_swap();
                    let child = tree.as_deref_mut().and_then(|t| t.children.last_mut()).map(|c| {
                        c.clear();
                        c.window = full;
                        c
                    });
                    result = self
                        .search_node(searchable, Some(mv), depth - 1, full, child, false)
                        .map(|r| -r.value);
                }
            }
            searchable.undo_internal_move(mv);
            let value = result?;

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

            window.alpha = window.alpha.max(value);
            if window.is_empty() {
                cut_at = Some(i + 1);
                break;
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
