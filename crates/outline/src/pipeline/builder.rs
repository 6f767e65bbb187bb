use crate::{
    algorithms::{BlurMethod, GaussianBlur},
    pipeline::OutlinePipeline,
    traits::FieldBlur,
    types::GeometryLimits,
};

/// Builder for creating outline pipelines with a fluent API
pub struct PipelineBuilder {
    blur: Option<Box<dyn FieldBlur>>,
    limits: GeometryLimits,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            blur: None,
            limits: GeometryLimits::default(),
        }
    }

    /// Set the blur stage (replaces any existing one)
    pub fn set_blur<B>(mut self, blur: B) -> Self
    where
        B: FieldBlur + 'static,
    {
        self.blur = Some(Box::new(blur));
        self
    }

    /// Pick one of the built-in blur stages
    pub fn with_blur_method(mut self, method: BlurMethod) -> Self {
        self.blur = Some(method.into_blur());
        self
    }

    pub fn with_limits(mut self, limits: GeometryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.limits.max_dimension = max_dimension;
        self
    }

    pub fn with_max_area(mut self, max_area: u64) -> Self {
        self.limits.max_area = max_area;
        self
    }

    /// Build the pipeline, defaulting to the Gaussian blur
    pub fn build(self) -> OutlinePipeline {
        let blur = self.blur.unwrap_or_else(|| Box::new(GaussianBlur));
        OutlinePipeline::new(blur, self.limits)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
