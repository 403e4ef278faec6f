use crate::domain::model::FanCurve;
use crate::utils::error::{ControlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/loki-control/config.toml";
pub const DEFAULT_SOCKET_PATH: &str = "/run/loki-master.sock";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub daemon: DaemonConfig,
    pub client: ClientConfig,
    pub hardware: HardwareConfig,
    pub power: PowerConfig,
    pub fan: FanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub socket_path: String,
    pub socket_mode: u32,
    pub allowed_write_prefixes: Vec<String>,
    pub allowed_programs: Vec<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            socket_mode: 0o666,
            allowed_write_prefixes: vec![
                "/sys/class/backlight".to_string(),
                "/sys/class/hwmon".to_string(),
                "/sys/class/leds".to_string(),
            ],
            allowed_programs: vec![
                "rfkill".to_string(),
                "wlr-randr".to_string(),
                "ryzenadj".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub socket_path: String,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            retry_attempts: 3,
            retry_delay_ms: 500,
            timeout_ms: 5000,
        }
    }
}

impl ClientConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub backlight_dir: String,
    pub hwmon_dir: String,
    pub fan_hwmon_name: String,
    pub rgb_led_dir: String,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            backlight_dir: "/sys/class/backlight".to_string(),
            hwmon_dir: "/sys/class/hwmon".to_string(),
            fan_hwmon_name: "aynec".to_string(),
            rgb_led_dir: "/sys/class/leds/ayn:rgb:joystick_rings".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub tdp_min_watts: u32,
    pub tdp_max_watts: u32,
    pub tdp_default_watts: u32,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            tdp_min_watts: 5,
            tdp_max_watts: 28,
            tdp_default_watts: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanConfig {
    pub poll_interval_ms: u64,
    pub quiet: Option<FanCurve>,
    pub aggressive: Option<FanCurve>,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            quiet: None,
            aggressive: None,
        }
    }
}

impl FanConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn quiet_curve(&self) -> FanCurve {
        self.quiet.clone().unwrap_or_else(FanCurve::quiet)
    }

    pub fn aggressive_curve(&self) -> FanCurve {
        self.aggressive.clone().unwrap_or_else(FanCurve::aggressive)
    }
}

impl ControlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用內建預設值；檔案存在但格式錯誤則回報錯誤
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(
                "No config file at {}, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        tracing::debug!("Loading configuration from {}", path.display());
        Self::from_file(path)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${LOKI_SOCKET})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ControlError::ParseError {
            what: "env substitution pattern".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_absolute_path("daemon.socket_path", &self.daemon.socket_path)?;
        validation::validate_absolute_path("client.socket_path", &self.client.socket_path)?;
        validation::validate_range("daemon.socket_mode", self.daemon.socket_mode, 0, 0o777)?;
        for prefix in &self.daemon.allowed_write_prefixes {
            validation::validate_absolute_path("daemon.allowed_write_prefixes", prefix)?;
        }
        for program in &self.daemon.allowed_programs {
            validation::validate_non_empty_string("daemon.allowed_programs", program)?;
            if program.contains('/') {
                return Err(ControlError::InvalidConfigValueError {
                    field: "daemon.allowed_programs".to_string(),
                    value: program.clone(),
                    reason: "Use a bare program name, not a path".to_string(),
                });
            }
        }

        validation::validate_positive_number(
            "client.retry_attempts",
            u64::from(self.client.retry_attempts),
            1,
        )?;
        validation::validate_positive_number("client.timeout_ms", self.client.timeout_ms, 1)?;

        validation::validate_absolute_path("hardware.backlight_dir", &self.hardware.backlight_dir)?;
        validation::validate_absolute_path("hardware.hwmon_dir", &self.hardware.hwmon_dir)?;
        validation::validate_absolute_path("hardware.rgb_led_dir", &self.hardware.rgb_led_dir)?;
        validation::validate_non_empty_string(
            "hardware.fan_hwmon_name",
            &self.hardware.fan_hwmon_name,
        )?;

        if self.power.tdp_min_watts >= self.power.tdp_max_watts {
            return Err(ControlError::ConfigValidationError {
                field: "power".to_string(),
                message: format!(
                    "tdp_min_watts ({}) must be lower than tdp_max_watts ({})",
                    self.power.tdp_min_watts, self.power.tdp_max_watts
                ),
            });
        }
        validation::validate_range(
            "power.tdp_default_watts",
            self.power.tdp_default_watts,
            self.power.tdp_min_watts,
            self.power.tdp_max_watts,
        )?;

        validation::validate_positive_number("fan.poll_interval_ms", self.fan.poll_interval_ms, 100)?;
        if let Some(curve) = &self.fan.quiet {
            validate_curve("fan.quiet", curve)?;
        }
        if let Some(curve) = &self.fan.aggressive {
            validate_curve("fan.aggressive", curve)?;
        }

        Ok(())
    }
}

fn validate_curve(field: &str, curve: &FanCurve) -> Result<()> {
    if curve.points.len() < 2 {
        return Err(ControlError::ConfigValidationError {
            field: field.to_string(),
            message: "A fan curve needs at least 2 points".to_string(),
        });
    }
    for point in &curve.points {
        if !point.temp.is_finite() {
            return Err(ControlError::InvalidConfigValueError {
                field: field.to_string(),
                value: point.temp.to_string(),
                reason: "Curve temperatures must be finite".to_string(),
            });
        }
        validation::validate_range(field, point.percent, 0.0, 100.0)?;
    }
    for pair in curve.points.windows(2) {
        if pair[1].temp <= pair[0].temp {
            return Err(ControlError::ConfigValidationError {
                field: field.to_string(),
                message: format!(
                    "Temperatures must strictly increase ({} then {})",
                    pair[0].temp, pair[1].temp
                ),
            });
        }
    }
    Ok(())
}

impl Validate for ControlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ControlConfig::from_toml_str("").unwrap();
        assert_eq!(config.daemon.socket_path, DEFAULT_SOCKET_PATH);
        assert_eq!(config.daemon.socket_mode, 0o666);
        assert_eq!(config.client.retry_attempts, 3);
        assert_eq!(config.hardware.fan_hwmon_name, "aynec");
        assert_eq!(config.power.tdp_default_watts, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[daemon]
socket_path = "/tmp/loki-test.sock"
socket_mode = 0o660
allowed_programs = ["rfkill"]

[power]
tdp_max_watts = 30

[fan]
poll_interval_ms = 2000
quiet = [
    { temp = 45.0, percent = 10.0 },
    { temp = 85.0, percent = 100.0 },
]
"#;

        let config = ControlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.daemon.socket_path, "/tmp/loki-test.sock");
        assert_eq!(config.daemon.socket_mode, 0o660);
        assert_eq!(config.daemon.allowed_programs, vec!["rfkill".to_string()]);
        // 未指定的欄位維持預設值
        assert_eq!(config.daemon.allowed_write_prefixes.len(), 3);
        assert_eq!(config.power.tdp_max_watts, 30);
        assert_eq!(config.power.tdp_min_watts, 5);
        assert_eq!(config.fan.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.fan.quiet_curve().points.len(), 2);
        assert_eq!(config.fan.aggressive_curve(), FanCurve::aggressive());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LOKI_TEST_SOCKET", "/tmp/from-env.sock");

        let toml_content = r#"
[client]
socket_path = "${LOKI_TEST_SOCKET}"
"#;

        let config = ControlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.client.socket_path, "/tmp/from-env.sock");

        std::env::remove_var("LOKI_TEST_SOCKET");
    }

    #[test]
    fn test_invalid_tdp_range_rejected() {
        let toml_content = r#"
[power]
tdp_min_watts = 20
tdp_max_watts = 10
tdp_default_watts = 15
"#;
        let config = ControlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_monotonic_curve_rejected() {
        let toml_content = r#"
[fan]
aggressive = [
    { temp = 50.0, percent = 10.0 },
    { temp = 40.0, percent = 50.0 },
]
"#;
        let config = ControlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fan.aggressive"));
    }

    #[test]
    fn test_nan_curve_points_rejected() {
        let toml_content = r#"
[fan]
quiet = [
    { temp = 40.0, percent = 0.0 },
    { temp = nan, percent = 50.0 },
    { temp = 80.0, percent = 100.0 },
]
"#;
        let config = ControlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ControlError::InvalidConfigValueError { .. }));
        assert!(err.to_string().contains("fan.quiet"));

        let toml_content = r#"
[fan]
quiet = [
    { temp = 40.0, percent = nan },
    { temp = 80.0, percent = 100.0 },
]
"#;
        let config = ControlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_program_path_rejected() {
        let toml_content = r#"
[daemon]
allowed_programs = ["/usr/bin/rfkill"]
"#;
        let config = ControlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(ControlConfig::from_toml_str("[daemon\nsocket_path = 1").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[hardware]\nfan_hwmon_name = \"oxpec\"\n")
            .unwrap();

        let config = ControlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.hardware.fan_hwmon_name, "oxpec");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ControlConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.client.socket_path, DEFAULT_SOCKET_PATH);
    }
}
