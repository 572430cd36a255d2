//! 竞技场配置
//!
//! 从 JSON 文件加载；未指定路径时读取 `<config_dir>/game-search/arena.json`，
//! 文件不存在则使用默认配置

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use game_ai::{Difficulty, SearchOptions, SearchStrategyType};
use protocol::Weights;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 参赛引擎
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contestant {
    pub name: String,
    /// 设置后覆盖 `options`
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub options: SearchOptions,
}

impl Contestant {
    pub fn new(name: impl Into<String>, options: SearchOptions) -> Self {
        Self {
            name: name.into(),
            difficulty: None,
            options,
        }
    }

    /// 实际使用的搜索配置
    pub fn search_options(&self) -> SearchOptions {
        match self.difficulty {
            Some(difficulty) => SearchOptions::from_difficulty(difficulty),
            None => self.options.clone(),
        }
    }
}

/// 竞技场配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub contestants: Vec<Contestant>,
    /// 每对引擎每种先后手下的局数
    pub games_per_pairing: u32,
    /// 同时进行的对局数
    pub max_concurrent: usize,
    /// 评估系数（空表示使用游戏默认值）
    pub weights: Vec<f64>,
    /// 报告目录（None 表示当前目录）
    pub report_dir: Option<PathBuf>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            contestants: vec![
                Contestant::new(
                    "negamax-4",
                    SearchOptions::default()
                        .with_strategy(SearchStrategyType::Negamax)
                        .with_look_ahead(4),
                ),
                Contestant::new(
                    "negascout-memory-6",
                    SearchOptions::default()
                        .with_strategy(SearchStrategyType::NegaScoutWithMemory)
                        .with_look_ahead(6)
                        .with_quiescence(true),
                ),
                Contestant::new(
                    "uct-2000",
                    SearchOptions::default()
                        .with_strategy(SearchStrategyType::MonteCarlo)
                        .with_monte_carlo(2000, 1.0),
                ),
            ],
            games_per_pairing: 2,
            max_concurrent: 4,
            weights: Vec::new(),
            report_dir: None,
        }
    }
}

impl ArenaConfig {
    /// 加载配置：显式路径必须存在，默认路径不存在时回退到默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!("未找到配置文件 {:?}，使用默认配置", path);
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// 从文件读取
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {:?}", path))?;
        info!("已加载配置 {:?}", path);
        Ok(config)
    }

    /// 写入文件（目录不存在时创建）
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("无法创建配置目录: {:?}", dir))?;
        }
        let content = serde_json::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, content).with_context(|| format!("写入配置文件失败: {:?}", path))?;
        Ok(())
    }

    /// 对局开始前检查配置
    pub fn validate(&self) -> Result<()> {
        if self.contestants.len() < 2 {
            anyhow::bail!("至少需要两个参赛引擎，当前 {} 个", self.contestants.len());
        }
        if self.games_per_pairing == 0 {
            anyhow::bail!("每对引擎至少进行一局");
        }
        if self.max_concurrent == 0 {
            anyhow::bail!("同时进行的对局数至少为 1");
        }
        for contestant in &self.contestants {
            contestant
                .search_options()
                .validate()
                .with_context(|| format!("参赛引擎 {} 的搜索配置无效", contestant.name))?;
        }
        Ok(())
    }

    pub fn weights(&self) -> Weights {
        Weights::new(self.weights.clone())
    }

    /// 报告目录
    pub fn report_dir(&self) -> PathBuf {
        self.report_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("无法获取配置目录")?;
    Ok(config_dir.join("game-search").join("arena.json"))
}
