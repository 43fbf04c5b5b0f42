//! Environment self-check for the consistency agent.

use std::path::Path;
use std::process::Command;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vguard_agent::AgentConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vguard=info".parse().expect("valid directive"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true).with_target(true))
        .with(env_filter)
        .init();

    let config = AgentConfig::from_env();
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    println!(
        "agent-selfcheck: starting with work_dir={}",
        config.work_dir
    );
    ensure_workdir(&config.work_dir).await?;
    ensure_tool("ffmpeg")?;
    ensure_tool("ffprobe")?;
    ensure_env_present(&["DASHSCOPE_API_KEY"])?;

    println!("agent-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

fn ensure_tool(tool: &str) -> anyhow::Result<()> {
    which::which(tool).map_err(|e| anyhow::anyhow!("{} not available: {}", tool, e))?;

    let output = Command::new(tool)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} failed to run: {}", tool, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} -version failed: {:?}",
            tool,
            output.status
        ));
    }
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}
