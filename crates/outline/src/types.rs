use std::{fmt, str::FromStr, sync::Arc};

use image::RgbaImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Thickness above which results are flagged as potentially slow or huge
pub const MAX_SAFE_THICKNESS: f64 = 500.0;
/// Hard ceiling for the thickness factor
pub const MAX_INPUT_THICKNESS: f64 = 1_000_000.0;
pub const MIN_THICKNESS: f64 = 1.0;
pub const DEFAULT_THICKNESS: f64 = 100.0;

pub const MIN_SMOOTHING: f64 = 0.0;
pub const MAX_SMOOTHING: f64 = 100.0;
/// Maps to an alpha threshold of 10
pub const DEFAULT_SMOOTHING: f64 = 96.1;

/// An opaque RGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase hex digits without the leading `#`
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self, alpha: u8) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, alpha])
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid hex color '{0}'")]
pub struct ParseColorError(pub String);

impl FromStr for RgbColor {
    type Err = ParseColorError;

    /// Accepts `#rgb`, `rgb`, `#rrggbb` and `rrggbb`, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(ParseColorError(s.to_string())),
        };

        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for RgbColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbColor> for String {
    fn from(color: RgbColor) -> Self {
        color.to_string()
    }
}

/// Snapshot of the user-controlled inputs for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutlineParameters {
    /// Outline thickness as a percentage of the image-relative base thickness
    #[schemars(range(min = 1.0, max = 1000000.0))]
    pub thickness_factor: f64,
    /// Edge softness; higher values keep more of the blurred halo
    #[schemars(range(min = 0.0, max = 100.0))]
    pub smoothing_factor: f64,
    /// Fill color of the outline, `#rrggbb`
    #[schemars(with = "String")]
    pub outline_color: RgbColor,
}

impl Default for OutlineParameters {
    fn default() -> Self {
        Self {
            thickness_factor: DEFAULT_THICKNESS,
            smoothing_factor: DEFAULT_SMOOTHING,
            outline_color: RgbColor::BLACK,
        }
    }
}

impl OutlineParameters {
    pub fn new(thickness_factor: f64, smoothing_factor: f64, outline_color: RgbColor) -> Self {
        Self {
            thickness_factor,
            smoothing_factor,
            outline_color,
        }
        .clamped()
    }

    pub fn with_thickness(mut self, thickness_factor: f64) -> Self {
        self.set_thickness(thickness_factor);
        self
    }

    pub fn with_smoothing(mut self, smoothing_factor: f64) -> Self {
        self.set_smoothing(smoothing_factor);
        self
    }

    pub fn with_color(mut self, outline_color: RgbColor) -> Self {
        self.outline_color = outline_color;
        self
    }

    /// Clamps to `[MIN_THICKNESS, MAX_INPUT_THICKNESS]`; NaN is ignored
    pub fn set_thickness(&mut self, thickness_factor: f64) {
        if !thickness_factor.is_nan() {
            self.thickness_factor = thickness_factor.clamp(MIN_THICKNESS, MAX_INPUT_THICKNESS);
        }
    }

    /// Clamps to `[MIN_SMOOTHING, MAX_SMOOTHING]`; NaN is ignored
    pub fn set_smoothing(&mut self, smoothing_factor: f64) {
        if !smoothing_factor.is_nan() {
            self.smoothing_factor = smoothing_factor.clamp(MIN_SMOOTHING, MAX_SMOOTHING);
        }
    }

    /// Copy with every field forced into its valid range
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        let mut out = Self {
            outline_color: self.outline_color,
            ..defaults
        };
        out.set_thickness(self.thickness_factor);
        out.set_smoothing(self.smoothing_factor);
        out
    }

    /// Above the safe ceiling the run is allowed but should be flagged
    pub fn exceeds_safe_thickness(&self) -> bool {
        self.thickness_factor > MAX_SAFE_THICKNESS
    }
}

/// Upper bounds on the working canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeometryLimits {
    pub max_dimension: u32,
    pub max_area: u64,
}

impl GeometryLimits {
    pub const DEFAULT_MAX_DIMENSION: u32 = 800_000;
    pub const DEFAULT_MAX_AREA: u64 =
        Self::DEFAULT_MAX_DIMENSION as u64 * Self::DEFAULT_MAX_DIMENSION as u64;
}

impl Default for GeometryLimits {
    fn default() -> Self {
        Self {
            max_dimension: Self::DEFAULT_MAX_DIMENSION,
            max_area: Self::DEFAULT_MAX_AREA,
        }
    }
}

/// Working geometry derived from the source size and thickness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeometryPlan {
    pub base_thickness: u32,
    pub radius: u32,
    pub safety_margin: u32,
    /// Position of the source's top-left corner inside the working buffer
    pub offset: u32,
    pub work_width: u32,
    pub work_height: u32,
}

impl GeometryPlan {
    pub fn work_area(&self) -> u64 {
        self.work_width as u64 * self.work_height as u64
    }
}

/// Tight bounds of the set pixels of a binary mask, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum BoundingBox {
    Empty,
    Bounds {
        min_x: u32,
        min_y: u32,
        max_x: u32,
        max_y: u32,
    },
}

impl BoundingBox {
    pub fn is_empty(&self) -> bool {
        matches!(self, BoundingBox::Empty)
    }

    pub fn width(&self) -> u32 {
        match *self {
            BoundingBox::Empty => 0,
            BoundingBox::Bounds { min_x, max_x, .. } => max_x - min_x + 1,
        }
    }

    pub fn height(&self) -> u32 {
        match *self {
            BoundingBox::Empty => 0,
            BoundingBox::Bounds { min_y, max_y, .. } => max_y - min_y + 1,
        }
    }

    /// Center in working-buffer coordinates
    pub fn center(&self) -> Option<(f64, f64)> {
        match *self {
            BoundingBox::Empty => None,
            BoundingBox::Bounds {
                min_x,
                min_y,
                max_x,
                max_y,
            } => Some((
                (min_x as f64 + max_x as f64) / 2.0,
                (min_y as f64 + max_y as f64) / 2.0,
            )),
        }
    }
}

/// Output of one pipeline run together with the values that produced it
#[derive(Debug, Clone)]
pub struct OutlineResult {
    pub image: Arc<RgbaImage>,
    pub plan: GeometryPlan,
    pub alpha_threshold: u8,
    pub bounds: BoundingBox,
}
