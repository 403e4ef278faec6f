use serde::{Deserialize, Serialize};

/// 前端送往特權 daemon 的請求，一行一個 JSON 物件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    Write { path: String, value: String },
    Run { program: String, args: Vec<String> },
}

impl Request {
    pub fn write(path: impl Into<String>, value: impl Into<String>) -> Self {
        Request::Write {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn run<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Request::Run {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Short human-readable form used in log lines.
    pub fn describe(&self) -> String {
        match self {
            Request::Write { path, value } => format!("write {:?} -> {}", value, path),
            Request::Run { program, args } => format!("run {} {}", program, args.join(" ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FanPoint {
    pub temp: f32,
    pub percent: f32,
}

impl FanPoint {
    pub const fn new(temp: f32, percent: f32) -> Self {
        Self { temp, percent }
    }
}

/// Temperature → fan duty curve, points sorted by ascending temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FanCurve {
    pub points: Vec<FanPoint>,
}

pub const QUIET_CURVE: [FanPoint; 5] = [
    FanPoint::new(40.0, 0.0),
    FanPoint::new(50.0, 20.0),
    FanPoint::new(60.0, 40.0),
    FanPoint::new(70.0, 70.0),
    FanPoint::new(80.0, 100.0),
];

pub const AGGRESSIVE_CURVE: [FanPoint; 5] = [
    FanPoint::new(30.0, 20.0),
    FanPoint::new(40.0, 40.0),
    FanPoint::new(50.0, 60.0),
    FanPoint::new(60.0, 80.0),
    FanPoint::new(70.0, 100.0),
];

impl FanCurve {
    pub fn new(points: Vec<FanPoint>) -> Self {
        Self { points }
    }

    pub fn quiet() -> Self {
        Self::new(QUIET_CURVE.to_vec())
    }

    pub fn aggressive() -> Self {
        Self::new(AGGRESSIVE_CURVE.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FanProfile {
    Auto,
    Quiet,
    Aggressive,
    Manual(f32),
}

impl std::fmt::Display for FanProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FanProfile::Auto => write!(f, "auto"),
            FanProfile::Quiet => write!(f, "quiet"),
            FanProfile::Aggressive => write!(f, "aggressive"),
            FanProfile::Manual(pct) => write!(f, "manual ({:.0}%)", pct),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    /// Refresh rate in mHz, as reported by wlr-randr.
    pub refresh: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RgbMode {
    Off,
    Breathe,
    Manual { hue: f64, brightness: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioKind {
    Wifi,
    Bluetooth,
}

impl RadioKind {
    pub fn rfkill_name(&self) -> &'static str {
        match self {
            RadioKind::Wifi => "wifi",
            RadioKind::Bluetooth => "bluetooth",
        }
    }
}

/// Captured output of an unprivileged helper command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}
