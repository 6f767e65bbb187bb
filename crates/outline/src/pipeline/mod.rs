pub mod builder;

use std::{sync::Arc, time::Instant};

use image::RgbaImage;
use tracing::{debug, info};

use crate::{
    algorithms::{alpha_threshold, apply_threshold, composite, extract_alpha, mask_bounds, plan_geometry},
    error::Result,
    traits::{FieldBlur, OutlineRenderer},
    types::{GeometryLimits, GeometryPlan, OutlineParameters, OutlineResult},
};

/// The outline pipeline: plan, extract alpha, blur, threshold, bound, composite
pub struct OutlinePipeline {
    blur: Box<dyn FieldBlur>,
    limits: GeometryLimits,
}

impl OutlinePipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    pub fn new(blur: Box<dyn FieldBlur>, limits: GeometryLimits) -> Self {
        Self { blur, limits }
    }

    pub fn limits(&self) -> &GeometryLimits {
        &self.limits
    }

    /// Working geometry for a source of the given size, without rendering
    pub fn plan(&self, width: u32, height: u32, params: &OutlineParameters) -> Result<GeometryPlan> {
        plan_geometry(width, height, params.clamped().thickness_factor, &self.limits)
    }

    /// Run every stage on `source`.
    ///
    /// Any stage error aborts the run; no partial image is returned.
    pub fn process(&self, source: &RgbaImage, params: &OutlineParameters) -> Result<OutlineResult> {
        let params = params.clamped();
        let started = Instant::now();
        let (width, height) = source.dimensions();

        let plan = plan_geometry(width, height, params.thickness_factor, &self.limits)?;
        info!(
            width,
            height,
            thickness = params.thickness_factor,
            radius = plan.radius,
            safety_margin = plan.safety_margin,
            offset = plan.offset,
            work_width = plan.work_width,
            work_height = plan.work_height,
            "planned outline geometry"
        );

        let stage = Instant::now();
        let mut field = extract_alpha(source, &plan)?;
        debug!(elapsed_ms = stage.elapsed().as_millis() as u64, "extracted alpha");

        let stage = Instant::now();
        self.blur.blur(&mut field, plan.radius)?;
        debug!(
            blur = self.blur.name(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "blurred opacity field"
        );

        let stage = Instant::now();
        let threshold = alpha_threshold(params.smoothing_factor);
        apply_threshold(&mut field, threshold);
        debug!(
            smoothing = params.smoothing_factor,
            threshold,
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "thresholded mask"
        );

        let stage = Instant::now();
        let bounds = mask_bounds(&field);
        debug!(?bounds, elapsed_ms = stage.elapsed().as_millis() as u64, "analyzed mask bounds");

        let stage = Instant::now();
        let image = composite(source, &field, &plan, &bounds, params.outline_color)?;
        debug!(elapsed_ms = stage.elapsed().as_millis() as u64, "composited output");

        info!(
            output_width = image.width(),
            output_height = image.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "outline rendered"
        );

        Ok(OutlineResult {
            image: Arc::new(image),
            plan,
            alpha_threshold: threshold,
            bounds,
        })
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: {} blur, max dimension {}, max area {}",
            self.blur.name(),
            self.limits.max_dimension,
            self.limits.max_area
        )
    }
}

impl Default for OutlinePipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl OutlineRenderer for OutlinePipeline {
    fn render(&self, source: &RgbaImage, params: &OutlineParameters) -> Result<OutlineResult> {
        self.process(source, params)
    }
}
