//! 搜索配置
//!
//! 搜索开始前校验，搜索过程中只读

use std::time::Duration;

use protocol::{SearchWindow, DEFAULT_LOOK_AHEAD, DEFAULT_PERCENTAGE_BEST_MOVES, MAX_QUIESCENT_DEPTH};
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// 搜索策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SearchStrategyType {
    /// 极大极小
    Minimax,
    /// 负极大值
    #[default]
    Negamax,
    /// 带置换表的负极大值
    NegamaxWithMemory,
    /// 负侦察（主要变例搜索）
    NegaScout,
    /// 带置换表的负侦察
    NegaScoutWithMemory,
    /// 蒙特卡洛树搜索（UCT）
    MonteCarlo,
}

impl SearchStrategyType {
    /// 是否使用置换表
    pub fn uses_memory(&self) -> bool {
        matches!(
            self,
            SearchStrategyType::NegamaxWithMemory | SearchStrategyType::NegaScoutWithMemory
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SearchStrategyType::Minimax => "MiniMax",
            SearchStrategyType::Negamax => "NegaMax",
            SearchStrategyType::NegamaxWithMemory => "NegaMax w/ memory",
            SearchStrategyType::NegaScout => "NegaScout",
            SearchStrategyType::NegaScoutWithMemory => "NegaScout w/ memory",
            SearchStrategyType::MonteCarlo => "Monte Carlo (UCT)",
        }
    }
}

/// AI 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// 简单：depth=2，只看一半候选走法
    Easy,
    /// 中等：depth=4
    Medium,
    /// 困难：depth=6，开启静态搜索和置换表
    Hard,
}

/// 穷举搜索配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BruteSearchOptions {
    /// 前瞻层数
    pub look_ahead: u32,
    /// 是否使用 Alpha-Beta 剪枝
    pub alpha_beta: bool,
    /// 是否使用静态搜索
    pub quiescence: bool,
    /// 静态搜索最多越过名义深度的层数
    pub max_quiescent_depth: u32,
}

impl Default for BruteSearchOptions {
    fn default() -> Self {
        Self {
            look_ahead: DEFAULT_LOOK_AHEAD,
            alpha_beta: true,
            quiescence: false,
            max_quiescent_depth: MAX_QUIESCENT_DEPTH as u32,
        }
    }
}

/// 候选走法筛选配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BestMovesSearchOptions {
    /// 每个节点只搜索按静态值排序后的前百分之几的走法
    pub percentage_best_moves: u32,
    /// 筛选后至少保留的走法数
    pub min_best_moves: usize,
    /// 随机对局时只在前百分之几的走法中随机选择
    pub percent_less_than_best_thresh: u32,
}

impl Default for BestMovesSearchOptions {
    fn default() -> Self {
        Self {
            percentage_best_moves: DEFAULT_PERCENTAGE_BEST_MOVES,
            min_best_moves: 1,
            percent_less_than_best_thresh: 50,
        }
    }
}

/// 蒙特卡洛搜索配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloSearchOptions {
    /// 最大模拟次数
    pub max_simulations: u32,
    /// 探索与利用的比例
    pub explore_exploit_ratio: f64,
    /// 随机对局最多走多少步
    pub random_look_ahead: u32,
    /// 并行模拟的线程数
    pub num_threads: usize,
}

impl Default for MonteCarloSearchOptions {
    fn default() -> Self {
        Self {
            max_simulations: 2000,
            explore_exploit_ratio: 1.0,
            random_look_ahead: 20,
            num_threads: 1,
        }
    }
}

/// 搜索配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub strategy: SearchStrategyType,
    pub brute: BruteSearchOptions,
    pub best_moves: BestMovesSearchOptions,
    pub monte_carlo: MonteCarloSearchOptions,
    /// 时间限制（毫秒），None 表示不限时
    pub time_limit_ms: Option<u64>,
    /// 随机数种子（蒙特卡洛模拟）
    pub seed: u64,
    /// 置换表大小（MB）
    pub tt_size_mb: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            strategy: SearchStrategyType::default(),
            brute: BruteSearchOptions::default(),
            best_moves: BestMovesSearchOptions::default(),
            monte_carlo: MonteCarloSearchOptions::default(),
            time_limit_ms: None,
            seed: 0x5EED,
            tt_size_mb: 16,
        }
    }
}

impl SearchOptions {
    /// 按难度生成配置
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut options = Self::default();
        match difficulty {
            Difficulty::Easy => {
                options.brute.look_ahead = 2;
                options.best_moves.percentage_best_moves = 50;
                options.time_limit_ms = Some(1000);
            }
            Difficulty::Medium => {
                options.brute.look_ahead = 4;
                options.time_limit_ms = Some(3000);
            }
            Difficulty::Hard => {
                options.strategy = SearchStrategyType::NegaScoutWithMemory;
                options.brute.look_ahead = 6;
                options.brute.quiescence = true;
                options.time_limit_ms = Some(5000);
            }
        }
        options
    }

    pub fn with_strategy(mut self, strategy: SearchStrategyType) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_look_ahead(mut self, look_ahead: u32) -> Self {
        self.brute.look_ahead = look_ahead;
        self
    }

    pub fn with_alpha_beta(mut self, alpha_beta: bool) -> Self {
        self.brute.alpha_beta = alpha_beta;
        self
    }

    pub fn with_quiescence(mut self, quiescence: bool) -> Self {
        self.brute.quiescence = quiescence;
        self
    }

    pub fn with_percentage_best_moves(mut self, percentage: u32) -> Self {
        self.best_moves.percentage_best_moves = percentage;
        self
    }

    pub fn with_monte_carlo(mut self, max_simulations: u32, explore_exploit_ratio: f64) -> Self {
        self.monte_carlo.max_simulations = max_simulations;
        self.monte_carlo.explore_exploit_ratio = explore_exploit_ratio;
        self
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.monte_carlo.num_threads = num_threads;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// 时间限制
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// 根节点的初始搜索窗口
    pub fn initial_window(&self) -> SearchWindow {
        SearchWindow::full()
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), OptionsError> {
        let brute = &self.brute;
        if brute.look_ahead < 1 {
            return Err(OptionsError::LookAhead(brute.look_ahead));
        }

        let best = &self.best_moves;
        if best.percentage_best_moves == 0 || best.percentage_best_moves > 100 {
            return Err(OptionsError::PercentageBestMoves(best.percentage_best_moves));
        }
        if best.percent_less_than_best_thresh == 0 || best.percent_less_than_best_thresh > 100 {
            return Err(OptionsError::PercentLessThanBestThresh(
                best.percent_less_than_best_thresh,
            ));
        }

        let mc = &self.monte_carlo;
        if mc.max_simulations == 0 {
            return Err(OptionsError::MaxSimulations);
        }
        if !mc.explore_exploit_ratio.is_finite() || mc.explore_exploit_ratio < 0.0 {
            return Err(OptionsError::ExploreExploitRatio(mc.explore_exploit_ratio));
        }
        if mc.random_look_ahead == 0 {
            return Err(OptionsError::RandomLookAhead);
        }
        if mc.num_threads == 0 {
            return Err(OptionsError::NumThreads);
        }

        if self.strategy.uses_memory() && self.tt_size_mb == 0 {
            return Err(OptionsError::TableSize);
        }

        Ok(())
    }
}
