//! 循环赛
//!
//! 每对引擎各执先 `games_per_pairing` 局。每局在阻塞线程池中独立进行，
//! 同时进行的对局数受信号量限制。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

use crate::config::{ArenaConfig, Contestant};
use crate::game::{play_match, MatchResult, Outcome};

/// 积分榜一行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// 胜 1 分，和 0.5 分
    pub points: f64,
    pub think_ms: u64,
}

/// 比赛报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config: ArenaConfig,
    pub standings: Vec<Standing>,
    pub matches: Vec<MatchResult>,
}

impl MatchReport {
    /// 写入 `dir`，返回文件路径
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("无法创建报告目录: {:?}", dir))?;
        let filename = format!("arena_{}.json", self.finished_at.format("%Y%m%d_%H%M%S"));
        let path = dir.join(filename);
        let content = serde_json::to_string_pretty(self).context("序列化比赛报告失败")?;
        fs::write(&path, content).with_context(|| format!("写入报告失败: {:?}", path))?;
        Ok(path)
    }
}

/// 一局的安排
#[derive(Debug, Clone)]
struct Pairing {
    first: usize,
    second: usize,
    round: u32,
}

/// 所有对局安排：每对引擎双方各执先 `games` 局
fn schedule(contestants: usize, games: u32) -> Vec<Pairing> {
    let mut pairings = Vec::new();
    for first in 0..contestants {
        for second in 0..contestants {
            if first == second {
                continue;
            }
            for round in 0..games {
                pairings.push(Pairing {
                    first,
                    second,
                    round,
                });
            }
        }
    }
    pairings
}

/// 进行循环赛
pub async fn run_tournament(config: ArenaConfig) -> Result<MatchReport> {
    config.validate()?;
    let started_at = Utc::now();
    let pairings = schedule(config.contestants.len(), config.games_per_pairing);
    let total = pairings.len();
    info!(
        "循环赛开始: {} 个引擎, {} 局, 同时进行 {} 局",
        config.contestants.len(),
        total,
        config.max_concurrent
    );

    let contestants: Arc<Vec<Contestant>> = Arc::new(config.contestants.clone());
    let weights = config.weights();
    let permits = Arc::new(Semaphore::new(config.max_concurrent));
    let mut tasks = JoinSet::new();

    for (index, pairing) in pairings.into_iter().enumerate() {
        let contestants = Arc::clone(&contestants);
        let weights = weights.clone();
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.context("信号量已关闭")?;
            let result = tokio::task::spawn_blocking(move || {
                play_match(
                    &contestants[pairing.first],
                    &contestants[pairing.second],
                    &weights,
                    pairing.round as u64,
                )
            })
            .await
            .context("对局线程异常退出")??;
            Ok::<_, anyhow::Error>((index, result))
        });
    }

    let mut finished = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.context("对局任务异常退出")??;
        info!(
            "[{}/{}] {} vs {}: {}",
            finished.len() + 1,
            total,
            result.first,
            result.second,
            result.winner().unwrap_or("和棋")
        );
        finished.push((index, result));
    }
    finished.sort_by_key(|(index, _)| *index);
    let matches: Vec<MatchResult> = finished.into_iter().map(|(_, result)| result).collect();

    let standings = standings(&config.contestants, &matches);
    Ok(MatchReport {
        started_at,
        finished_at: Utc::now(),
        config,
        standings,
        matches,
    })
}

/// 按积分从高到低排列（同分保持配置顺序）
fn standings(contestants: &[Contestant], matches: &[MatchResult]) -> Vec<Standing> {
    let mut table: Vec<Standing> = contestants
        .iter()
        .map(|c| Standing {
            name: c.name.clone(),
            ..Standing::default()
        })
        .collect();
    let position: HashMap<&str, usize> = contestants
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), i))
        .collect();

    for result in matches {
        let (Some(&first), Some(&second)) = (
            position.get(result.first.as_str()),
            position.get(result.second.as_str()),
        ) else {
            continue;
        };
        table[first].think_ms += result.first_think_ms;
        table[second].think_ms += result.second_think_ms;
        let (winner, loser) = match result.outcome {
            Outcome::FirstWins => (first, second),
            Outcome::SecondWins => (second, first),
            Outcome::Draw => {
                for i in [first, second] {
                    table[i].draws += 1;
                    table[i].points += 0.5;
                }
                continue;
            }
        };
        table[winner].wins += 1;
        table[winner].points += 1.0;
        table[loser].losses += 1;
    }

    table.sort_by(|a, b| b.points.total_cmp(&a.points));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_ai::{SearchOptions, SearchStrategyType};
    use tempfile::TempDir;

    fn small_config() -> ArenaConfig {
        ArenaConfig {
            contestants: vec![
                Contestant::new(
                    "greedy",
                    SearchOptions::default()
                        .with_strategy(SearchStrategyType::Negamax)
                        .with_look_ahead(1),
                ),
                Contestant::new(
                    "deep",
                    SearchOptions::default()
                        .with_strategy(SearchStrategyType::NegaScoutWithMemory)
                        .with_look_ahead(9),
                ),
            ],
            games_per_pairing: 1,
            max_concurrent: 2,
            weights: Vec::new(),
            report_dir: None,
        }
    }

    #[test]
    fn test_schedule_covers_both_colours() {
        let pairings = schedule(3, 2);
        assert_eq!(pairings.len(), 3 * 2 * 2);
        assert!(pairings.iter().all(|p| p.first != p.second));
        assert_eq!(
            pairings.iter().filter(|p| p.first == 0 && p.second == 1).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_tournament_report() {
        let report = run_tournament(small_config()).await.unwrap();
        assert_eq!(report.matches.len(), 2);
        assert_eq!(report.matches[0].first, "greedy");
        assert_eq!(report.matches[1].first, "deep");

        let total: f64 = report.standings.iter().map(|s| s.points).sum();
        assert_eq!(total, 2.0);
        // 完整搜索的一方不会输
        let deep = report.standings.iter().find(|s| s.name == "deep").unwrap();
        assert_eq!(deep.losses, 0);

        let temp_dir = TempDir::new().unwrap();
        let path = report.save(temp_dir.path()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["matches"].as_array().map(|m| m.len()), Some(2));
    }

    #[tokio::test]
    async fn test_invalid_config_fails_fast() {
        let mut config = small_config();
        config.contestants.pop();
        assert!(run_tournament(config).await.is_err());
    }
}
