use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Point;
use crate::foundation::error::{DialError, DialResult};

const SECS_PER_DAY: u32 = 24 * 60 * 60;

/// Wall-clock time of day with second resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    secs: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32, second: u32) -> DialResult<Self> {
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(DialError::validation(format!(
                "time {hour:02}:{minute:02}:{second:02} out of range"
            )));
        }
        Ok(Self {
            secs: hour * 3600 + minute * 60 + second,
        })
    }

    pub fn hour(self) -> u32 {
        self.secs / 3600
    }

    pub fn minute(self) -> u32 {
        self.secs / 60 % 60
    }

    pub fn second(self) -> u32 {
        self.secs % 60
    }

    /// Move forward by `secs`, wrapping past midnight.
    pub fn advance(self, secs: u64) -> Self {
        let step = (secs % u64::from(SECS_PER_DAY)) as u32;
        Self {
            secs: (self.secs + step) % SECS_PER_DAY,
        }
    }

    /// Hours since midnight at minute resolution: `hour + minute / 60`.
    pub fn combined(self) -> f64 {
        f64::from(self.hour()) + f64::from(self.minute()) / 60.0
    }

    pub fn angle(self) -> f64 {
        combined_to_angle(self.combined())
    }
}

impl FromStr for ClockTime {
    type Err = DialError;

    /// `HH:MM` or `HH:MM:SS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || DialError::validation(format!("invalid time \"{s}\", expected HH:MM[:SS]"));
        let parts: Vec<&str> = s.trim().split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid());
        }
        let num = |p: &str| p.parse::<u32>().map_err(|_| invalid());
        let hour = num(parts[0])?;
        let minute = num(parts[1])?;
        let second = parts.get(2).map(|p| num(p)).transpose()?.unwrap_or(0);
        Self::new(hour, minute, second)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl serde::Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ClockTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hours since midnight to radians, with 00:00 at angle 0.
pub fn combined_to_angle(combined: f64) -> f64 {
    combined / 24.0 * TAU
}

pub fn polar_to_cartesian(center: Point, angle: f64, magnitude: f64) -> Point {
    Point::new(
        angle.cos() * magnitude + center.x,
        angle.sin() * magnitude + center.y,
    )
}

/// 12-hour `h:mm`, with midnight and noon shown as 12.
pub fn format_time(time: ClockTime) -> String {
    let h = time.hour() % 12;
    format!("{}:{:02}", if h == 0 { 12 } else { h }, time.minute())
}

/// Radii and anchor points derived from the output size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DialLayout {
    pub dim: f64,
    pub center: Point,
    /// Outer face radius.
    pub r: f64,
    pub inner: f64,
    pub sun_path: f64,
    pub sun_glow: f64,
    pub sun_main: f64,
    pub keypoint: f64,
}

impl DialLayout {
    pub fn new(size: u32) -> Self {
        let dim = f64::from(size);
        let r = dim / 2.0 * 0.9;
        Self {
            dim,
            center: Point::new(dim / 2.0, dim / 2.0),
            r,
            inner: r * 0.45,
            sun_path: r * 0.6,
            sun_glow: r * 0.7,
            sun_main: r * 0.07,
            keypoint: r * 0.02,
        }
    }

    pub fn polar(&self, angle: f64, magnitude: f64) -> Point {
        polar_to_cartesian(self.center, angle, magnitude)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DialAngles {
    pub sun: f64,
    pub sunrise: f64,
    pub sunset: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DialPoints {
    pub sun: Point,
    pub sunrise: Point,
    pub sunset: Point,
    /// Center of the time readout disc, opposite the sun.
    pub dial: Point,
}

/// Per-frame values the dial scene is drawn from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DialState {
    pub now: ClockTime,
    /// Sun time as hours since midnight.
    pub sun: f64,
    pub angles: DialAngles,
    pub points: DialPoints,
}

impl DialState {
    pub fn compute(
        layout: &DialLayout,
        now: ClockTime,
        sunrise: ClockTime,
        sunset: ClockTime,
    ) -> Self {
        let angles = DialAngles {
            sun: now.angle(),
            sunrise: sunrise.angle(),
            sunset: sunset.angle(),
        };
        let points = DialPoints {
            sun: layout.polar(angles.sun, layout.sun_path),
            sunrise: layout.polar(angles.sunrise, layout.sun_path),
            sunset: layout.polar(angles.sunset, layout.sun_path),
            dial: layout.polar(angles.sun, -layout.inner / 2.0),
        };
        Self {
            now,
            sun: now.combined(),
            angles,
            points,
        }
    }
}
