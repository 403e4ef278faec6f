use crate::domain::model::Request;
use crate::domain::ports::PrivilegedChannel;
use crate::utils::error::{ControlError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Backlight {
    brightness_path: PathBuf,
    max_brightness: u32,
}

impl Backlight {
    /// Uses the first device under `dir` (sorted by name).
    pub async fn discover(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let device = super::sorted_entries(dir)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ControlError::DeviceNotFound {
                device: format!("backlight under {}", dir.display()),
            })?;

        let max_path = device.join("max_brightness");
        let max_brightness = super::read_trimmed(&max_path)
            .await?
            .parse::<u32>()
            .map_err(|e| ControlError::ParseError {
                what: max_path.display().to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            "Backlight {} (max {})",
            device.display(),
            max_brightness
        );

        Ok(Self {
            brightness_path: device.join("brightness"),
            max_brightness,
        })
    }

    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    pub fn brightness_path(&self) -> &Path {
        &self.brightness_path
    }

    pub async fn read_percent(&self) -> Result<f64> {
        let raw = super::read_trimmed(&self.brightness_path)
            .await?
            .parse::<u32>()
            .map_err(|e| ControlError::ParseError {
                what: self.brightness_path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(raw_to_percent(raw, self.max_brightness))
    }

    /// Returns the raw value that was written.
    pub async fn set_percent(&self, channel: &dyn PrivilegedChannel, percent: f64) -> Result<u32> {
        let raw = percent_to_raw(percent, self.max_brightness);
        channel
            .send_checked(Request::write(
                self.brightness_path.to_string_lossy(),
                raw.to_string(),
            ))
            .await?;
        tracing::info!("☀️ Brightness {:.0}% ({}/{})", percent, raw, self.max_brightness);
        Ok(raw)
    }
}

pub fn percent_to_raw(percent: f64, max: u32) -> u32 {
    let pct = percent.clamp(0.0, 100.0) / 100.0;
    (pct * f64::from(max)).round() as u32
}

pub fn raw_to_percent(raw: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    (f64::from(raw.min(max)) / f64::from(max) * 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controls::test_support::RecordingChannel;
    use tempfile::TempDir;

    fn fake_backlight(root: &Path, name: &str, max: &str, current: &str) {
        let dev = root.join(name);
        std::fs::create_dir_all(&dev).unwrap();
        std::fs::write(dev.join("max_brightness"), max).unwrap();
        std::fs::write(dev.join("brightness"), current).unwrap();
    }

    #[test]
    fn test_percent_to_raw() {
        assert_eq!(percent_to_raw(50.0, 255), 128);
        assert_eq!(percent_to_raw(100.0, 96000), 96000);
        assert_eq!(percent_to_raw(0.0, 255), 0);
        assert_eq!(percent_to_raw(150.0, 200), 200);
        assert_eq!(percent_to_raw(-5.0, 200), 0);
    }

    #[test]
    fn test_raw_to_percent() {
        assert_eq!(raw_to_percent(128, 255), 50.0);
        assert_eq!(raw_to_percent(10, 0), 0.0);
    }

    #[tokio::test]
    async fn test_discover_picks_first_device() {
        let dir = TempDir::new().unwrap();
        fake_backlight(dir.path(), "b_backlight", "100", "10");
        fake_backlight(dir.path(), "a_backlight", "255\n", "64\n");

        let backlight = Backlight::discover(dir.path()).await.unwrap();
        assert_eq!(backlight.max_brightness(), 255);
        assert!(backlight.brightness_path().ends_with("a_backlight/brightness"));
        assert_eq!(backlight.read_percent().await.unwrap(), 25.0);
    }

    #[tokio::test]
    async fn test_discover_without_device() {
        let dir = TempDir::new().unwrap();
        let err = Backlight::discover(dir.path()).await.unwrap_err();
        assert!(matches!(err, ControlError::DeviceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_discover_bad_max() {
        let dir = TempDir::new().unwrap();
        fake_backlight(dir.path(), "panel", "bright", "1");
        let err = Backlight::discover(dir.path()).await.unwrap_err();
        assert!(matches!(err, ControlError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_set_percent_sends_write() {
        let dir = TempDir::new().unwrap();
        fake_backlight(dir.path(), "panel", "400", "0");
        let backlight = Backlight::discover(dir.path()).await.unwrap();
        let channel = RecordingChannel::default();

        let raw = backlight.set_percent(&channel, 75.0).await.unwrap();

        assert_eq!(raw, 300);
        assert_eq!(
            channel.requests(),
            vec![Request::write(
                backlight.brightness_path().to_string_lossy(),
                "300"
            )]
        );
    }
}
