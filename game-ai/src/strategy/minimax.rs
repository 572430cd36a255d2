//! 极大极小搜索
//!
//! 所有分值都是先手方视角：先手方取最大，后手方取最小。
//! 开启 Alpha-Beta 时使用 fail-soft 剪枝，只有严格更好的走法才替换当前最佳，
//! 因此剪枝与否选出的根走法和分值相同。

use std::time::Instant;

use protocol::{Move, Perspective, SearchWindow, Searchable, Weights, INFINITY};
use tracing::{debug, warn};

use super::brute::{
    add_tree_child, finish_node, record_last_child, BruteContext, Expansion, Scored,
};
use super::{SearchOutcome, SearchStrategy};
use crate::control::SearchControl;
use crate::error::{Result, SearchError};
use crate::options::{SearchOptions, SearchStrategyType};
use crate::tree::{PruneType, SearchTreeNode};

/// 极大极小策略
pub struct MinimaxStrategy {
    options: SearchOptions,
    weights: Weights,
    control: SearchControl,
    moves_considered: u64,
    percent_done: u32,
}

impl MinimaxStrategy {
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

impl<S: Searchable> SearchStrategy<S> for MinimaxStrategy {
    fn search(
        &mut self,
        searchable: &mut S,
        last_move: Option<&Move<S::Payload>>,
        mut tree: Option<&mut SearchTreeNode<S::Payload>>,
    ) -> Result<SearchOutcome<S::Payload>> {
        let started = Instant::now();
        let mut ctx = BruteContext::new(&self.options, &self.weights, &self.control);
        ctx.check_root(searchable, last_move)?;

        let window = self.options.initial_window();
        if let Some(root) = tree.as_deref_mut() {
            root.clear();
            root.window = window;
        }

        let depth = ctx.look_ahead();
        let result = minimax(&mut ctx, searchable, last_move, depth, window, tree.as_deref_mut());
        self.moves_considered = ctx.moves_considered;
        self.percent_done = ctx.percent_done;
        let completed = !ctx.interrupted;

        let scored = result?;
        let best_move = scored.best.ok_or(SearchError::NoLegalMoves {
            moves_played: searchable.num_moves(),
        })?;
        if let Some(root) = tree {
            root.set_inherited_value(scored.value);
        }
        if !completed {
            warn!("极大极小搜索被中断，返回目前最佳走法");
        }
        debug!(
            "MiniMax: {} value={} moves={} elapsed={:?}",
            best_move,
            scored.value,
            self.moves_considered,
            started.elapsed()
        );

        Ok(SearchOutcome {
            best_move,
            value: scored.value,
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
        SearchStrategyType::Minimax
    }
}

fn minimax<S: Searchable>(
    ctx: &mut BruteContext<'_>,
    searchable: &mut S,
    last_move: Option<&Move<S::Payload>>,
    depth: i32,
    mut window: SearchWindow,
    mut tree: Option<&mut SearchTreeNode<S::Payload>>,
) -> Result<Scored<S::Payload>> {
    let mut moves = match ctx.expand(searchable, last_move, depth)? {
        Expansion::Leaf => {
            let value = searchable.worth(last_move, ctx.weights, Perspective::PlayerOne);
            return Ok(Scored::leaf(value));
        }
        Expansion::Moves(moves) => moves,
    };

    let maximizing = searchable.player_to_move(last_move).is_player_one();
    let total = moves.len();
    let mut best_value = if maximizing { -INFINITY } else { INFINITY };
    let mut best_index = None;
    let mut cut_at = None;

    for i in 0..total {
        if ctx.should_stop(i) {
            break;
        }
        ctx.moves_considered += 1;

        let mv = &moves[i];
        searchable.make_internal_move(mv);
        let child = add_tree_child(tree.as_deref_mut(), mv, window);
        let result = minimax(ctx, searchable, Some(mv), depth - 1, window, child);
        searchable.undo_internal_move(mv);
        let value = result?.value;

        ctx.update_percent_done(depth, i + 1, total);
        if ctx.interrupted && best_index.is_some() {
            break;
        }

        moves[i].inherited_value = value;
        record_last_child(tree.as_deref_mut(), value);

        let better = if maximizing {
            value > best_value
        } else {
            value < best_value
        };
        if better {
            best_value = value;
            best_index = Some(i);
        }

        if ctx.alpha_beta() {
            if maximizing {
                window.alpha = window.alpha.max(value);
            } else {
                window.beta = window.beta.min(value);
            }
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

    let pruned = cut_at.map_or(&[][..], |at| &moves[at..]);
    let (threshold, prune) = if maximizing {
        (window.beta, PruneType::Beta)
    } else {
        (window.alpha, PruneType::Alpha)
    };
    finish_node(tree, best_index, pruned, best_value, threshold, prune);

    let mut best = moves[best_index].clone();
    best.selected = true;
    Ok(Scored {
        value: best_value,
        best: Some(best),
    })
}
