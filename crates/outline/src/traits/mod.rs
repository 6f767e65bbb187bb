use image::{GrayImage, RgbaImage};
use crate::{
    error::Result,
    types::{OutlineParameters, OutlineResult},
};

/// Trait for blur algorithms applied to the opacity field
pub trait FieldBlur: Send + Sync {
    /// Blur the field in place; `radius == 0` must leave it untouched
    fn blur(&self, field: &mut GrayImage, radius: u32) -> Result<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Main trait for producing an outlined image
pub trait OutlineRenderer: Send + Sync {
    /// Render the outline around `source` with the given parameters
    fn render(&self, source: &RgbaImage, params: &OutlineParameters) -> Result<OutlineResult>;
}
