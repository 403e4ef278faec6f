use crate::domain::model::{Request, Rgb, RgbMode};
use crate::domain::ports::PrivilegedChannel;
use crate::utils::error::Result;
use std::path::PathBuf;

// led_mode values understood by the joystick ring driver
const LED_MODE_BREATHE: u8 = 0;
const LED_MODE_STATIC: u8 = 1;

pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let c = v * s;
    let hh = (h / 60.0) % 6.0;
    let x = c * (1.0 - ((hh % 2.0) - 1.0).abs());
    let (r1, g1, b1) = match hh as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let channel = |value: f64| ((value + m) * 255.0).round() as u8;
    Rgb {
        r: channel(r1),
        g: channel(g1),
        b: channel(b1),
    }
}

/// Colour as it would look at `brightness` (0-255), for previews.
pub fn preview(hue: f64, brightness: u8) -> Rgb {
    let full = hsv_to_rgb(clamp_hue(hue), 1.0, 1.0);
    let scale = f64::from(brightness) / 255.0;
    let dim = |value: u8| (f64::from(value) * scale).round() as u8;
    Rgb {
        r: dim(full.r),
        g: dim(full.g),
        b: dim(full.b),
    }
}

fn clamp_hue(hue: f64) -> f64 {
    if hue.is_nan() {
        0.0
    } else {
        hue.clamp(0.0, 359.999)
    }
}

#[derive(Debug, Clone)]
pub struct RgbLeds {
    base: PathBuf,
}

impl RgbLeds {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn attribute(&self, name: &str) -> String {
        self.base.join(name).to_string_lossy().into_owned()
    }

    /// Writes every attribute of `mode` in order.
    pub async fn apply(&self, channel: &dyn PrivilegedChannel, mode: RgbMode) -> Result<()> {
        for request in self.requests_for(mode) {
            channel.send_checked(request).await?;
        }
        tracing::info!("💡 RGB mode {:?}", mode);
        Ok(())
    }

    pub fn requests_for(&self, mode: RgbMode) -> Vec<Request> {
        match mode {
            RgbMode::Off => vec![
                Request::write(self.attribute("led_mode"), LED_MODE_STATIC.to_string()),
                Request::write(self.attribute("brightness"), "0"),
                Request::write(self.attribute("multi_intensity"), "0 0 0"),
            ],
            RgbMode::Breathe => vec![Request::write(
                self.attribute("led_mode"),
                LED_MODE_BREATHE.to_string(),
            )],
            RgbMode::Manual { hue, brightness } => {
                let colour = hsv_to_rgb(clamp_hue(hue), 1.0, 1.0);
                vec![
                    Request::write(self.attribute("led_mode"), LED_MODE_STATIC.to_string()),
                    Request::write(self.attribute("brightness"), brightness.to_string()),
                    Request::write(self.attribute("multi_intensity"), colour.to_string()),
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::controls::test_support::RecordingChannel;

    fn rgb(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }

    #[test]
    fn test_hsv_primary_hues() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), rgb(255, 0, 0));
        assert_eq!(hsv_to_rgb(60.0, 1.0, 1.0), rgb(255, 255, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), rgb(0, 255, 0));
        assert_eq!(hsv_to_rgb(180.0, 1.0, 1.0), rgb(0, 255, 255));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), rgb(0, 0, 255));
        assert_eq!(hsv_to_rgb(300.0, 1.0, 1.0), rgb(255, 0, 255));
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), rgb(255, 0, 0));
    }

    #[test]
    fn test_hsv_intermediate_and_grey() {
        assert_eq!(hsv_to_rgb(30.0, 1.0, 1.0), rgb(255, 128, 0));
        assert_eq!(hsv_to_rgb(200.0, 0.0, 0.5), rgb(128, 128, 128));
    }

    #[test]
    fn test_preview_scales_brightness() {
        assert_eq!(preview(120.0, 255), rgb(0, 255, 0));
        assert_eq!(preview(120.0, 0), rgb(0, 0, 0));
        assert_eq!(preview(0.0, 128), rgb(128, 0, 0));
    }

    #[test]
    fn test_off_requests() {
        let leds = RgbLeds::new("/sys/class/leds/ring");
        assert_eq!(
            leds.requests_for(RgbMode::Off),
            vec![
                Request::write("/sys/class/leds/ring/led_mode", "1"),
                Request::write("/sys/class/leds/ring/brightness", "0"),
                Request::write("/sys/class/leds/ring/multi_intensity", "0 0 0"),
            ]
        );
    }

    #[tokio::test]
    async fn test_manual_and_breathe_apply() {
        let leds = RgbLeds::new("/sys/class/leds/ring");
        let channel = RecordingChannel::default();

        leds.apply(
            &channel,
            RgbMode::Manual {
                hue: 240.0,
                brightness: 200,
            },
        )
        .await
        .unwrap();
        leds.apply(&channel, RgbMode::Breathe).await.unwrap();

        assert_eq!(
            channel.requests(),
            vec![
                Request::write("/sys/class/leds/ring/led_mode", "1"),
                Request::write("/sys/class/leds/ring/brightness", "200"),
                Request::write("/sys/class/leds/ring/multi_intensity", "0 0 255"),
                Request::write("/sys/class/leds/ring/led_mode", "0"),
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_stops_on_first_failure() {
        let leds = RgbLeds::new("/sys/class/leds/ring");
        let channel = RecordingChannel::failing("Permission denied");
        assert!(leds.apply(&channel, RgbMode::Off).await.is_err());
        assert_eq!(channel.requests().len(), 1);
    }
}
