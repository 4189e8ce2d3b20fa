use std::path::Path;
use std::process::Command;

use reel_media::{check_ffmpeg, check_ffprobe};
use reel_models::MusicGenre;
use reel_providers::ProviderConfig;
use reel_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env();
    let providers = ProviderConfig::from_env();

    println!(
        "reel-selfcheck: starting with temp_dir={} output_dir={}",
        config.temp_dir.display(),
        config.output_dir.display()
    );
    ensure_dirs(&config).await?;
    ensure_binary("ffmpeg", check_ffmpeg().is_ok())?;
    ensure_binary("ffprobe", check_ffprobe().is_ok())?;
    ensure_providers(&providers)?;
    report_music(&config.music_dir);

    println!("reel-selfcheck: ok");
    Ok(())
}

async fn ensure_dirs(config: &WorkerConfig) -> anyhow::Result<()> {
    config
        .ensure_dirs()
        .await
        .map_err(|e| anyhow::anyhow!("cannot create working directories: {}", e))
}

fn ensure_binary(name: &str, on_path: bool) -> anyhow::Result<()> {
    if !on_path {
        return Err(anyhow::anyhow!("{} not found on PATH", name));
    }
    let output = Command::new(name)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not available: {}", name, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!("{} -version failed: {:?}", name, output.status));
    }
    Ok(())
}

fn ensure_providers(config: &ProviderConfig) -> anyhow::Result<()> {
    println!(
        "reel-selfcheck: openai={} elevenlabs={} pexels={}",
        config.has_openai(),
        config.has_elevenlabs(),
        config.has_pexels()
    );
    if !config.has_openai() {
        return Err(anyhow::anyhow!("missing required env var OPENAI_API_KEY"));
    }
    Ok(())
}

fn report_music(music_dir: &Path) {
    for genre in MusicGenre::ALL {
        if let Some(file) = genre.asset_file() {
            let path = music_dir.join(file);
            if !path.exists() {
                println!("reel-selfcheck: warning: {} missing, {} reels will have no music", path.display(), genre);
            }
        }
    }
}
