use crate::config::toml_config::DEFAULT_CONFIG_PATH;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "loki-ctl")]
#[command(version, about = "Quick settings for Linux handhelds")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the daemon socket path from config
    #[arg(long, global = true)]
    pub socket: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the current state of every control
    Status,

    /// Toggle the Wi-Fi radio
    Wifi,

    /// Toggle the Bluetooth radio
    Bluetooth,

    /// Block or unblock every radio
    Airplane {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Set screen brightness in percent
    Brightness {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },

    /// Set output volume of the default sink in percent
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },

    /// Toggle mute on the default sink
    Mute,

    /// Inspect or change the display mode
    #[command(subcommand)]
    Display(DisplayCommand),

    /// Set the sustained power limit in watts; omit to restore the default
    Tdp { watts: Option<f64> },

    /// Select a fan profile
    #[command(subcommand)]
    Fan(FanCommand),

    /// Control the joystick ring lighting
    #[command(subcommand)]
    Rgb(RgbCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DisplayCommand {
    /// List resolutions and refresh rates of the active output
    List,
    /// Apply a resolution, e.g. 1920x1080
    Set(DisplaySetArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DisplaySetArgs {
    pub resolution: String,

    /// Refresh rate in Hz; defaults to the lowest rate for the resolution
    #[arg(long)]
    pub refresh: Option<f64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum FanCommand {
    /// Hand control back to the firmware
    Auto,
    /// Run the quiet curve until interrupted
    Quiet,
    /// Run the aggressive curve until interrupted
    Aggressive,
    /// Fixed duty cycle in percent
    Manual {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum RgbCommand {
    Off,
    Breathe,
    Manual {
        /// Hue in degrees (0-360)
        #[arg(long, default_value = "0")]
        hue: f64,
        #[arg(long, default_value = "255")]
        brightness: u8,
    },
}

#[derive(Debug, Clone, Parser)]
#[command(name = "loki-daemon")]
#[command(version, about = "Privileged helper for loki-ctl")]
pub struct DaemonArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the listening socket path from config
    #[arg(long)]
    pub socket: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fan_manual() {
        let cli = CliConfig::try_parse_from(["loki-ctl", "fan", "manual", "40"]).unwrap();
        match cli.command {
            Command::Fan(FanCommand::Manual { percent }) => assert_eq!(percent, 40),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_brightness_out_of_range_rejected() {
        assert!(CliConfig::try_parse_from(["loki-ctl", "brightness", "150"]).is_err());
    }

    #[test]
    fn test_global_socket_override() {
        let cli = CliConfig::try_parse_from([
            "loki-ctl",
            "display",
            "set",
            "1280x720",
            "--refresh",
            "60",
            "--socket",
            "/tmp/x.sock",
        ])
        .unwrap();
        assert_eq!(cli.socket.as_deref(), Some("/tmp/x.sock"));
        match cli.command {
            Command::Display(DisplayCommand::Set(args)) => {
                assert_eq!(args.resolution, "1280x720");
                assert_eq!(args.refresh, Some(60.0));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_tdp_watts_optional() {
        let cli = CliConfig::try_parse_from(["loki-ctl", "tdp"]).unwrap();
        assert!(matches!(cli.command, Command::Tdp { watts: None }));

        let cli = CliConfig::try_parse_from(["loki-ctl", "tdp", "18"]).unwrap();
        assert!(matches!(cli.command, Command::Tdp { watts: Some(w) } if w == 18.0));
    }

    #[test]
    fn test_daemon_args() {
        let args = DaemonArgs::try_parse_from(["loki-daemon", "--json-logs"]).unwrap();
        assert!(args.json_logs);
        assert!(args.socket.is_none());
    }
}
