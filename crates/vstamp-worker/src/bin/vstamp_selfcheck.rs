use std::path::Path;
use std::process::Command;

use vstamp_media::ToolPaths;
use vstamp_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "vstamp-selfcheck: starting with work_dir={}",
        config.work_dir.display()
    );
    ensure_workdir(&config.work_dir).await?;

    let tools = ToolPaths::locate(None)?;
    ensure_tool("ffmpeg", &tools.ffmpeg)?;
    ensure_tool("ffprobe", &tools.ffprobe)?;

    println!("vstamp-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    let probe = tempfile::tempfile_in(path)
        .map_err(|e| anyhow::anyhow!("work dir {} not writable: {}", path.display(), e))?;
    drop(probe);
    Ok(())
}

fn ensure_tool(name: &str, path: &Path) -> anyhow::Result<()> {
    let output = Command::new(path)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not available at {}: {}", name, path.display(), e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} -version failed: {:?}",
            name,
            output.status
        ));
    }
    let version = String::from_utf8_lossy(&output.stdout);
    println!(
        "vstamp-selfcheck: {} -> {}",
        path.display(),
        version.lines().next().unwrap_or_default()
    );
    Ok(())
}
