use crate::config::PowerConfig;
use crate::domain::model::Request;
use crate::domain::ports::PrivilegedChannel;
use crate::utils::error::Result;
use std::fmt;

#[derive(Debug, Clone, Copy)]
pub struct TdpLimits {
    pub min_watts: u32,
    pub max_watts: u32,
    /// Applied when no explicit limit is requested.
    pub default_watts: u32,
}

impl From<&PowerConfig> for TdpLimits {
    fn from(config: &PowerConfig) -> Self {
        Self {
            min_watts: config.tdp_min_watts,
            max_watts: config.tdp_max_watts,
            default_watts: config.tdp_default_watts,
        }
    }
}

impl TdpLimits {
    /// Snaps to whole watts inside the allowed range.
    pub fn snap(&self, watts: f64) -> u32 {
        let rounded = watts.round().max(0.0) as u32;
        rounded.clamp(self.min_watts, self.max_watts)
    }
}

impl fmt::Display for TdpLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} W (default {} W)",
            self.min_watts, self.max_watts, self.default_watts
        )
    }
}

/// ryzenadj takes the STAPM limit in milliwatts.
pub fn stapm_argument(watts: u32) -> String {
    format!("{}000", watts)
}

pub async fn set_tdp(channel: &dyn PrivilegedChannel, limits: TdpLimits, watts: f64) -> Result<u32> {
    let snapped = limits.snap(watts);
    if f64::from(snapped) != watts {
        tracing::debug!("TDP {} W snapped to {} W", watts, snapped);
    }
    channel
        .send_checked(Request::run(
            "ryzenadj",
            ["--stapm-limit".to_string(), stapm_argument(snapped)],
        ))
        .await?;
    tracing::info!("⚡ TDP limit {} W", snapped);
    Ok(snapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controls::test_support::RecordingChannel;

    fn limits() -> TdpLimits {
        TdpLimits::from(&PowerConfig::default())
    }

    #[test]
    fn test_limits_carry_configured_default() {
        let config = PowerConfig {
            tdp_default_watts: 12,
            ..PowerConfig::default()
        };
        let limits = TdpLimits::from(&config);
        assert_eq!(limits.default_watts, 12);
        assert_eq!(limits.to_string(), "5-28 W (default 12 W)");
    }

    #[test]
    fn test_snap_rounds_and_clamps() {
        assert_eq!(limits().snap(15.0), 15);
        assert_eq!(limits().snap(14.6), 15);
        assert_eq!(limits().snap(14.4), 14);
        assert_eq!(limits().snap(2.0), 5);
        assert_eq!(limits().snap(40.0), 28);
        assert_eq!(limits().snap(-3.0), 5);
    }

    #[tokio::test]
    async fn test_set_tdp_request() {
        let channel = RecordingChannel::default();
        let applied = set_tdp(&channel, limits(), 18.2).await.unwrap();

        assert_eq!(applied, 18);
        assert_eq!(
            channel.requests(),
            vec![Request::run("ryzenadj", ["--stapm-limit", "18000"])]
        );
    }
}
