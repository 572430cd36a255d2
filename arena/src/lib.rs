//! 引擎对战竞技场
//!
//! 包含:
//! - JSON 配置（参赛引擎与搜索配置）
//! - 单局对弈记录
//! - 并发循环赛与比赛报告

pub mod config;
pub mod game;
pub mod tournament;

pub use config::{default_config_path, ArenaConfig, Contestant};
pub use game::{play_match, MatchResult, Outcome, PlyRecord};
pub use tournament::{run_tournament, MatchReport, Standing};
