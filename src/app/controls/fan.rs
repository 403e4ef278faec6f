use crate::config::{FanConfig, HardwareConfig};
use crate::domain::model::{FanCurve, FanProfile, Request};
use crate::domain::ports::PrivilegedChannel;
use crate::utils::error::{ControlError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

impl FanCurve {
    /// Duty cycle in percent for `temp` °C: flat outside the curve, linear
    /// between points. An empty curve yields full speed.
    pub fn eval(&self, temp: f32) -> f32 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 100.0,
        };
        if temp <= first.temp {
            return first.percent;
        }
        for pair in self.points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if temp <= hi.temp {
                let ratio = (temp - lo.temp) / (hi.temp - lo.temp);
                return lo.percent + ratio * (hi.percent - lo.percent);
            }
        }
        last.percent
    }
}

pub fn percent_to_pwm(percent: f32) -> u8 {
    ((percent.clamp(0.0, 100.0) / 100.0) * 255.0).round() as u8
}

/// Scans `dir` for the hwmon device whose `name` attribute matches.
pub async fn find_hwmon(dir: impl AsRef<Path>, name: &str) -> Option<PathBuf> {
    let dir = dir.as_ref();
    let entries = match super::sorted_entries(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", dir.display(), e);
            return None;
        }
    };

    for base in entries {
        match super::read_trimmed(&base.join("name")).await {
            Ok(found) => {
                tracing::debug!(" - {} -> {}", base.display(), found);
                if found == name {
                    tracing::debug!("Found {} hwmon at {}", name, base.display());
                    return Some(base);
                }
            }
            Err(e) => tracing::debug!("Failed to read {}/name: {}", base.display(), e),
        }
    }
    None
}

/// First readable `temp{1..5}_input`, converted from m°C.
pub async fn read_temp(base: impl AsRef<Path>) -> Option<f32> {
    let base = base.as_ref();
    for idx in 1..=5 {
        let path = base.join(format!("temp{}_input", idx));
        if let Ok(raw) = super::read_trimmed(&path).await {
            if let Ok(milli) = raw.parse::<f32>() {
                return Some(milli / 1000.0);
            }
        }
    }
    None
}

#[derive(Debug, Clone)]
pub struct FanDevice {
    base: PathBuf,
}

impl FanDevice {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub async fn discover(hardware: &HardwareConfig) -> Result<Self> {
        find_hwmon(&hardware.hwmon_dir, &hardware.fan_hwmon_name)
            .await
            .map(Self::new)
            .ok_or_else(|| ControlError::DeviceNotFound {
                device: format!("{} hwmon (fan control)", hardware.fan_hwmon_name),
            })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub async fn temperature(&self) -> Option<f32> {
        read_temp(&self.base).await
    }

    fn attribute(&self, name: &str) -> String {
        self.base.join(name).to_string_lossy().into_owned()
    }

    /// `pwm1_enable`: 0 hands control to the firmware, 1 means manual PWM.
    pub async fn set_manual(&self, channel: &dyn PrivilegedChannel, manual: bool) -> Result<()> {
        let value = if manual { "1" } else { "0" };
        channel
            .send_checked(Request::write(self.attribute("pwm1_enable"), value))
            .await
    }

    pub async fn set_pwm(&self, channel: &dyn PrivilegedChannel, pwm: u8) -> Result<()> {
        channel
            .send_checked(Request::write(self.attribute("pwm1"), pwm.to_string()))
            .await
    }

    /// One controller step: read the temperature and push the curve's duty
    /// cycle. Returns `None` when no temperature sensor is readable.
    pub async fn apply_curve(
        &self,
        channel: &dyn PrivilegedChannel,
        curve: &FanCurve,
    ) -> Result<Option<(f32, u8)>> {
        let temp = match self.temperature().await {
            Some(temp) => temp,
            None => return Ok(None),
        };
        let pwm = percent_to_pwm(curve.eval(temp));
        self.set_manual(channel, true).await?;
        self.set_pwm(channel, pwm).await?;
        Ok(Some((temp, pwm)))
    }
}

#[derive(Debug, Clone)]
pub struct FanCurves {
    pub quiet: FanCurve,
    pub aggressive: FanCurve,
}

impl From<&FanConfig> for FanCurves {
    fn from(config: &FanConfig) -> Self {
        Self {
            quiet: config.quiet_curve(),
            aggressive: config.aggressive_curve(),
        }
    }
}

impl FanCurves {
    fn for_profile(&self, profile: FanProfile) -> Option<&FanCurve> {
        match profile {
            FanProfile::Quiet => Some(&self.quiet),
            FanProfile::Aggressive => Some(&self.aggressive),
            FanProfile::Auto | FanProfile::Manual(_) => None,
        }
    }
}

/// Owns the background curve loop. The active profile is shared through a
/// watch channel; the loop only runs while a curve profile is selected.
/// Profile switches and curve steps hold `write_lock`, so a step that was
/// already in flight can never land after a switch to auto or manual.
pub struct FanController {
    device: FanDevice,
    channel: Arc<dyn PrivilegedChannel>,
    profile_tx: watch::Sender<FanProfile>,
    write_lock: Arc<Mutex<()>>,
    task: JoinHandle<()>,
}

impl FanController {
    pub fn spawn(
        device: FanDevice,
        channel: Arc<dyn PrivilegedChannel>,
        curves: FanCurves,
        interval: Duration,
    ) -> Self {
        let (profile_tx, profile_rx) = watch::channel(FanProfile::Auto);
        let write_lock = Arc::new(Mutex::new(()));
        let task = tokio::spawn(curve_loop(
            device.clone(),
            Arc::clone(&channel),
            curves,
            interval,
            profile_rx,
            Arc::clone(&write_lock),
        ));
        Self {
            device,
            channel,
            profile_tx,
            write_lock,
            task,
        }
    }

    pub fn profile(&self) -> FanProfile {
        *self.profile_tx.borrow()
    }

    pub async fn set_profile(&self, profile: FanProfile) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let channel = self.channel.as_ref();
        match profile {
            FanProfile::Auto => self.device.set_manual(channel, false).await?,
            FanProfile::Quiet | FanProfile::Aggressive => {
                self.device.set_manual(channel, true).await?
            }
            FanProfile::Manual(percent) => {
                let pwm = percent_to_pwm(percent);
                self.device.set_manual(channel, true).await?;
                self.device.set_pwm(channel, pwm).await?;
                tracing::debug!("Manual fan speed {}% -> {}", percent, pwm);
            }
        }
        self.profile_tx.send_replace(profile);
        tracing::info!("🌀 Fan profile: {}", profile);
        Ok(())
    }

    /// Stops the curve loop. The last written fan state stays in effect.
    pub async fn shutdown(self) {
        drop(self.profile_tx);
        if let Err(e) = self.task.await {
            tracing::warn!("Fan loop ended abnormally: {}", e);
        }
    }
}

async fn curve_loop(
    device: FanDevice,
    channel: Arc<dyn PrivilegedChannel>,
    curves: FanCurves,
    interval: Duration,
    mut profile_rx: watch::Receiver<FanProfile>,
    write_lock: Arc<Mutex<()>>,
) {
    loop {
        let profile = *profile_rx.borrow_and_update();
        match curves.for_profile(profile) {
            None => {
                if profile_rx.changed().await.is_err() {
                    break;
                }
            }
            Some(curve) => {
                let guard = write_lock.lock().await;
                if *profile_rx.borrow() != profile {
                    continue;
                }
                let step = device.apply_curve(channel.as_ref(), curve).await;
                drop(guard);
                match step {
                    Ok(Some((temp, pwm))) => {
                        tracing::debug!("{} curve: {:.1}°C -> pwm {}", profile, temp, pwm)
                    }
                    Ok(None) => tracing::warn!(
                        "No readable temperature under {}",
                        device.base().display()
                    ),
                    Err(e) => tracing::warn!("Fan curve step failed: {}", e),
                }
                tokio::select! {
                    changed = profile_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }
    }
    tracing::debug!("Fan curve loop stopped");
}
