use crate::domain::model::{DisplayMode, Request};
use crate::domain::ports::{CommandRunner, PrivilegedChannel};
use crate::utils::error::{ControlError, Result};
use std::collections::BTreeSet;

/// Output name and its advertised modes.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputModes {
    pub name: String,
    pub modes: Vec<DisplayMode>,
}

/// Parses `wlr-randr --json`: the first connector carrying a `modes` array
/// wins. A mode missing any field invalidates the whole answer.
pub fn parse_modes(json: &str) -> Option<OutputModes> {
    let val: serde_json::Value = serde_json::from_str(json).ok()?;
    let connectors = val.get("connectors")?.as_array()?;
    let conn = connectors.iter().find(|c| c.get("modes").is_some())?;
    let name = conn.get("name")?.as_str()?.to_string();

    let modes = conn
        .get("modes")?
        .as_array()?
        .iter()
        .map(|m| {
            let field = |key: &str| m.get(key).and_then(|v| v.as_u64()).map(|v| v as u32);
            Some(DisplayMode {
                width: field("width")?,
                height: field("height")?,
                refresh: field("refresh")?,
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(OutputModes { name, modes })
}

pub async fn query_modes(runner: &dyn CommandRunner) -> Result<OutputModes> {
    let out = runner.output("wlr-randr", &["--json"]).await?;
    parse_modes(&out.stdout).ok_or_else(|| ControlError::DeviceNotFound {
        device: "wlr-randr output with display modes".to_string(),
    })
}

/// Distinct resolutions, ascending.
pub fn resolutions(modes: &[DisplayMode]) -> Vec<(u32, u32)> {
    modes
        .iter()
        .map(|m| (m.width, m.height))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn refresh_rates(modes: &[DisplayMode], width: u32, height: u32) -> Vec<u32> {
    let mut rates: Vec<u32> = modes
        .iter()
        .filter(|m| m.width == width && m.height == height)
        .map(|m| m.refresh)
        .collect();
    rates.sort_unstable();
    rates.dedup();
    rates
}

pub fn format_refresh(millihertz: u32) -> String {
    if millihertz % 1000 == 0 {
        format!("{} Hz", millihertz / 1000)
    } else {
        format!("{:.1} Hz", f64::from(millihertz) / 1000.0)
    }
}

pub fn mode_argument(mode: &DisplayMode) -> String {
    let hz = f64::from(mode.refresh) / 1000.0;
    format!("{}x{}@{}Hz", mode.width, mode.height, hz)
}

pub fn parse_resolution(text: &str) -> Result<(u32, u32)> {
    let parse_err = || ControlError::ParseError {
        what: "resolution".to_string(),
        message: format!("expected WIDTHxHEIGHT, got '{}'", text),
    };
    let (w, h) = text.trim().split_once(['x', 'X']).ok_or_else(parse_err)?;
    let width = w.trim().parse::<u32>().map_err(|_| parse_err())?;
    let height = h.trim().parse::<u32>().map_err(|_| parse_err())?;
    Ok((width, height))
}

/// Picks the mode for a resolution. Without an explicit rate the lowest one
/// is used; an explicit rate must be within 0.5 Hz of an advertised one.
pub fn select_mode(
    modes: &[DisplayMode],
    width: u32,
    height: u32,
    refresh_hz: Option<f64>,
) -> Result<DisplayMode> {
    let rates = refresh_rates(modes, width, height);
    if rates.is_empty() {
        return Err(ControlError::ParseError {
            what: "resolution".to_string(),
            message: format!("{}x{} is not supported by this output", width, height),
        });
    }

    let refresh = match refresh_hz {
        None => rates[0],
        Some(hz) => {
            let target = hz * 1000.0;
            rates
                .iter()
                .copied()
                .filter(|r| (f64::from(*r) - target).abs() < 500.0)
                .min_by(|a, b| {
                    let da = (f64::from(*a) - target).abs();
                    let db = (f64::from(*b) - target).abs();
                    da.total_cmp(&db)
                })
                .ok_or_else(|| ControlError::ParseError {
                    what: "refresh rate".to_string(),
                    message: format!(
                        "{} Hz is not available at {}x{} (available: {})",
                        hz,
                        width,
                        height,
                        rates
                            .iter()
                            .map(|r| format_refresh(*r))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                })?
        }
    };

    Ok(DisplayMode {
        width,
        height,
        refresh,
    })
}

pub async fn apply(channel: &dyn PrivilegedChannel, output: &str, mode: &DisplayMode) -> Result<()> {
    let argument = mode_argument(mode);
    channel
        .send_checked(Request::run(
            "wlr-randr",
            ["--output", output, "--mode", argument.as_str()],
        ))
        .await?;
    tracing::info!("🖥️ {} set to {}", output, argument);
    Ok(())
}
