use crate::domain::model::{RadioKind, Request};
use crate::domain::ports::{CommandRunner, PrivilegedChannel};
use crate::utils::error::Result;

/// First `Soft blocked:` line of `rfkill list` output.
pub fn parse_soft_blocked(text: &str) -> Option<bool> {
    text.lines()
        .find_map(|line| line.trim().strip_prefix("Soft blocked:"))
        .map(|rest| rest.trim() == "yes")
}

pub async fn is_blocked(runner: &dyn CommandRunner, kind: RadioKind) -> Option<bool> {
    match runner.output("rfkill", &["list", kind.rfkill_name()]).await {
        Ok(out) => parse_soft_blocked(&out.stdout),
        Err(e) => {
            tracing::debug!("rfkill list {} failed: {}", kind.rfkill_name(), e);
            None
        }
    }
}

/// Airplane mode is on when every radio is soft-blocked.
pub async fn airplane_active(runner: &dyn CommandRunner) -> bool {
    is_blocked(runner, RadioKind::Wifi).await == Some(true)
        && is_blocked(runner, RadioKind::Bluetooth).await == Some(true)
}

pub async fn toggle(channel: &dyn PrivilegedChannel, kind: RadioKind) -> Result<()> {
    channel
        .send_checked(Request::run("rfkill", ["toggle", kind.rfkill_name()]))
        .await?;
    tracing::info!("📶 Toggled {}", kind.rfkill_name());
    Ok(())
}

pub async fn set_airplane(channel: &dyn PrivilegedChannel, enabled: bool) -> Result<()> {
    let action = if enabled { "block" } else { "unblock" };
    channel
        .send_checked(Request::run("rfkill", [action, "all"]))
        .await?;
    tracing::info!("✈️ Airplane mode {}", if enabled { "on" } else { "off" });
    Ok(())
}
