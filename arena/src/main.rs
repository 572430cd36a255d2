use std::path::PathBuf;

use anyhow::{Context, Result};
use arena::{run_tournament, ArenaConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 用法: arena [配置文件]
#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("arena=info".parse()?))
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ArenaConfig::load(config_path.as_deref()).context("加载竞技场配置失败")?;
    let report_dir = config.report_dir();

    let report = run_tournament(config).await?;
    for (rank, standing) in report.standings.iter().enumerate() {
        info!(
            "{}. {} 积分 {:.1} (胜 {} 负 {} 和 {}, 思考 {} ms)",
            rank + 1,
            standing.name,
            standing.points,
            standing.wins,
            standing.losses,
            standing.draws,
            standing.think_ms
        );
    }

    let path = report.save(&report_dir)?;
    info!("比赛报告已写入 {:?}", path);
    Ok(())
}
