use crate::adapters::SystemCommandRunner;
use crate::app::controls::display::{self, OutputModes};
use crate::app::controls::fan::{FanController, FanCurves, FanDevice};
use crate::app::controls::power::{self, TdpLimits};
use crate::app::controls::rgb::RgbLeds;
use crate::app::controls::{audio, backlight::Backlight, radio};
use crate::config::ControlConfig;
use crate::core::client::DaemonClient;
use crate::domain::model::{DisplayMode, RadioKind, RgbMode};
use crate::domain::ports::{CommandRunner, PrivilegedChannel};
use crate::utils::error::Result;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Every quick setting of the panel, bound to one config, one daemon channel
/// and one command runner.
pub struct ControlCenter {
    config: ControlConfig,
    channel: Arc<dyn PrivilegedChannel>,
    runner: Arc<dyn CommandRunner>,
}

impl ControlCenter {
    pub fn new(
        config: ControlConfig,
        channel: Arc<dyn PrivilegedChannel>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            channel,
            runner,
        }
    }

    pub fn with_daemon(config: ControlConfig) -> Self {
        let client = DaemonClient::new(&config.client);
        Self::new(config, Arc::new(client), Arc::new(SystemCommandRunner))
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub async fn status(&self) -> StatusReport {
        let runner = self.runner.as_ref();

        let brightness = match Backlight::discover(&self.config.hardware.backlight_dir).await {
            Ok(backlight) => backlight.read_percent().await.ok(),
            Err(e) => {
                tracing::debug!("Backlight unavailable: {}", e);
                None
            }
        };

        let fan = FanDevice::discover(&self.config.hardware).await.ok();
        let temperature = match &fan {
            Some(device) => device.temperature().await,
            None => None,
        };

        let wifi_blocked = radio::is_blocked(runner, RadioKind::Wifi).await;
        let bluetooth_blocked = radio::is_blocked(runner, RadioKind::Bluetooth).await;

        StatusReport {
            brightness,
            sink: audio::default_sink(runner).await,
            wifi_blocked,
            bluetooth_blocked,
            airplane: wifi_blocked == Some(true) && bluetooth_blocked == Some(true),
            display: display::query_modes(runner).await.ok(),
            fan_hwmon: fan.map(|device| device.base().to_path_buf()),
            temperature,
            tdp: self.tdp_limits(),
        }
    }

    pub async fn toggle_radio(&self, kind: RadioKind) -> Result<()> {
        radio::toggle(self.channel.as_ref(), kind).await
    }

    pub async fn set_airplane(&self, enabled: bool) -> Result<()> {
        radio::set_airplane(self.channel.as_ref(), enabled).await
    }

    pub async fn set_brightness(&self, percent: f64) -> Result<u32> {
        let backlight = Backlight::discover(&self.config.hardware.backlight_dir).await?;
        backlight.set_percent(self.channel.as_ref(), percent).await
    }

    pub async fn set_volume(&self, percent: u8) -> Result<()> {
        let sink = audio::default_sink(self.runner.as_ref()).await;
        audio::set_volume(self.runner.as_ref(), &sink, percent).await
    }

    pub async fn toggle_mute(&self) -> Result<()> {
        let sink = audio::default_sink(self.runner.as_ref()).await;
        audio::toggle_mute(self.runner.as_ref(), &sink).await
    }

    pub async fn display_modes(&self) -> Result<OutputModes> {
        display::query_modes(self.runner.as_ref()).await
    }

    pub async fn set_display(&self, resolution: &str, refresh_hz: Option<f64>) -> Result<DisplayMode> {
        let (width, height) = display::parse_resolution(resolution)?;
        let output = self.display_modes().await?;
        let mode = display::select_mode(&output.modes, width, height, refresh_hz)?;
        display::apply(self.channel.as_ref(), &output.name, &mode).await?;
        Ok(mode)
    }

    pub fn tdp_limits(&self) -> TdpLimits {
        TdpLimits::from(&self.config.power)
    }

    /// Applies `watts`, or the configured default when `None`.
    pub async fn set_tdp(&self, watts: Option<f64>) -> Result<u32> {
        let limits = self.tdp_limits();
        let watts = watts.unwrap_or_else(|| f64::from(limits.default_watts));
        power::set_tdp(self.channel.as_ref(), limits, watts).await
    }

    /// Starts a fan controller; the caller picks the profile.
    pub async fn fan_controller(&self) -> Result<FanController> {
        let device = FanDevice::discover(&self.config.hardware).await?;
        tracing::debug!("Fan control base: {}", device.base().display());
        Ok(FanController::spawn(
            device,
            Arc::clone(&self.channel),
            FanCurves::from(&self.config.fan),
            self.config.fan.poll_interval(),
        ))
    }

    pub async fn set_rgb(&self, mode: RgbMode) -> Result<()> {
        RgbLeds::new(&self.config.hardware.rgb_led_dir)
            .apply(self.channel.as_ref(), mode)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub brightness: Option<f64>,
    pub sink: String,
    pub wifi_blocked: Option<bool>,
    pub bluetooth_blocked: Option<bool>,
    pub airplane: bool,
    pub display: Option<OutputModes>,
    pub fan_hwmon: Option<PathBuf>,
    pub temperature: Option<f32>,
    pub tdp: TdpLimits,
}

fn radio_state(blocked: Option<bool>) -> &'static str {
    match blocked {
        Some(true) => "off",
        Some(false) => "on",
        None => "unknown",
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.brightness {
            Some(pct) => writeln!(f, "Brightness: {:.0}%", pct)?,
            None => writeln!(f, "Brightness: unavailable")?,
        }
        writeln!(f, "Audio sink: {}", self.sink)?;
        writeln!(f, "Wi-Fi:      {}", radio_state(self.wifi_blocked))?;
        writeln!(f, "Bluetooth:  {}", radio_state(self.bluetooth_blocked))?;
        writeln!(f, "Airplane:   {}", if self.airplane { "on" } else { "off" })?;
        writeln!(f, "TDP:        {}", self.tdp)?;

        match &self.display {
            Some(output) => {
                writeln!(f, "Display:    {}", output.name)?;
                for (w, h) in display::resolutions(&output.modes) {
                    let rates: Vec<String> = display::refresh_rates(&output.modes, w, h)
                        .into_iter()
                        .map(display::format_refresh)
                        .collect();
                    writeln!(f, "  {}x{}: {}", w, h, rates.join(", "))?;
                }
            }
            None => writeln!(f, "Display:    unavailable")?,
        }

        match (&self.fan_hwmon, self.temperature) {
            (Some(base), Some(temp)) => {
                write!(f, "Fan:        {} ({:.1}°C)", base.display(), temp)
            }
            (Some(base), None) => write!(f, "Fan:        {}", base.display()),
            (None, _) => write!(f, "Fan:        unavailable"),
        }
    }
}
