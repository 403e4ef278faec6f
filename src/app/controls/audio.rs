use crate::domain::ports::CommandRunner;
use crate::utils::error::{ControlError, Result};

pub const FALLBACK_SINK: &str = "@DEFAULT_SINK@";

/// Extracts the sink name from `pactl info` output.
pub fn parse_default_sink(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("Default Sink:"))
        .map(|rest| rest.trim().to_string())
        .filter(|sink| !sink.is_empty())
}

pub async fn default_sink(runner: &dyn CommandRunner) -> String {
    match runner.output("pactl", &["info"]).await {
        Ok(out) => parse_default_sink(&out.stdout).unwrap_or_else(|| {
            tracing::debug!("pactl info has no default sink, using {}", FALLBACK_SINK);
            FALLBACK_SINK.to_string()
        }),
        Err(e) => {
            tracing::warn!("Failed to run pactl info: {}", e);
            FALLBACK_SINK.to_string()
        }
    }
}

pub async fn set_volume(runner: &dyn CommandRunner, sink: &str, percent: u8) -> Result<()> {
    let level = format!("{}%", percent.min(100));
    run_pactl(runner, &["set-sink-volume", sink, &level]).await?;
    tracing::info!("🔊 Volume {} on {}", level, sink);
    Ok(())
}

pub async fn toggle_mute(runner: &dyn CommandRunner, sink: &str) -> Result<()> {
    run_pactl(runner, &["set-sink-mute", sink, "toggle"]).await?;
    tracing::info!("🔇 Toggled mute on {}", sink);
    Ok(())
}

async fn run_pactl(runner: &dyn CommandRunner, args: &[&str]) -> Result<()> {
    let out = runner.output("pactl", args).await?;
    if out.success {
        Ok(())
    } else {
        Err(ControlError::CommandFailed {
            program: "pactl".to_string(),
            message: out.stderr.trim().to_string(),
        })
    }
}
