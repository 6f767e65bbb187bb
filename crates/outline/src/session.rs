use std::{path::Path, sync::Arc};

use image::RgbaImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::{info, warn};

use crate::{
    error::{OutlineError, Result},
    io,
    pipeline::OutlinePipeline,
    traits::OutlineRenderer,
    types::{OutlineParameters, OutlineResult, RgbColor},
};

#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params")]
#[strum(serialize_all = "snake_case")]
pub enum SessionCommand {
    /// Change the outline thickness factor
    #[serde(rename = "set_thickness")]
    SetThickness {
        #[schemars(range(min = 1.0, max = 1000000.0))]
        thickness: f64,
    },

    /// Change the edge smoothing factor
    #[serde(rename = "set_smoothing")]
    SetSmoothing {
        #[schemars(range(min = 0.0, max = 100.0))]
        smoothing: f64,
    },

    /// Change the outline color
    #[serde(rename = "set_color")]
    SetColor {
        #[schemars(with = "String")]
        color: RgbColor,
    },

    /// Render the current source with the current parameters
    #[serde(rename = "render")]
    Render,
}

impl SessionCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SessionCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SetThickness { .. } => "Set the outline thickness as a percentage of the base thickness",
            Self::SetSmoothing { .. } => "Set edge smoothing (0 hugs the subject, 100 keeps the whole halo)",
            Self::SetColor { .. } => "Set the outline fill color",
            Self::Render => "Render the outline for the loaded image",
        }
    }
}

/// A run that has been admitted by the session and may execute off-thread
pub struct RenderJob {
    source: Arc<RgbaImage>,
    params: OutlineParameters,
    renderer: Arc<dyn OutlineRenderer>,
}

impl RenderJob {
    pub fn params(&self) -> &OutlineParameters {
        &self.params
    }

    pub fn run(&self) -> Result<OutlineResult> {
        self.renderer.render(&self.source, &self.params)
    }
}

/// Orchestrator state: the loaded image, current parameters, whether a run
/// is active and the last successful output
#[derive(Clone)]
pub struct OutlineSession {
    source: Option<Arc<RgbaImage>>,
    params: OutlineParameters,
    processing: bool,
    last_output: Option<Arc<RgbaImage>>,
    renderer: Arc<dyn OutlineRenderer>,
}

impl OutlineSession {
    pub fn new() -> Self {
        Self::with_renderer(OutlinePipeline::default())
    }

    /// Create a session around a custom renderer
    pub fn with_renderer<R>(renderer: R) -> Self
    where
        R: OutlineRenderer + 'static,
    {
        Self {
            source: None,
            params: OutlineParameters::default(),
            processing: false,
            last_output: None,
            renderer: Arc::new(renderer),
        }
    }

    /// Load a PNG source from file
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        match io::load_png(path) {
            Ok(image) => {
                self.set_source(image);
                Ok(())
            }
            Err(e) => {
                self.clear_source();
                Err(e)
            }
        }
    }

    /// Load a PNG source from encoded bytes
    pub fn load_image_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        match io::load_rgba_from_bytes(bytes) {
            Ok(image) => {
                self.set_source(image);
                Ok(())
            }
            Err(e) => {
                self.clear_source();
                Err(e)
            }
        }
    }

    /// Set the source image directly
    pub fn set_source(&mut self, image: RgbaImage) {
        info!(width = image.width(), height = image.height(), "source image set");
        self.source = Some(Arc::new(image));
    }

    pub fn clear_source(&mut self) {
        self.source = None;
        self.last_output = None;
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn parameters(&self) -> &OutlineParameters {
        &self.params
    }

    /// Replace all parameters; out-of-range values are clamped
    pub fn set_parameters(&mut self, params: OutlineParameters) {
        self.params = params.clamped();
        self.warn_if_unsafe();
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        self.params.set_thickness(thickness);
        self.warn_if_unsafe();
    }

    pub fn set_smoothing(&mut self, smoothing: f64) {
        self.params.set_smoothing(smoothing);
    }

    pub fn set_color(&mut self, color: RgbColor) {
        self.params.outline_color = color;
    }

    fn warn_if_unsafe(&self) {
        if self.params.exceeds_safe_thickness() {
            warn!(
                thickness = self.params.thickness_factor,
                "thickness above the safe ceiling; rendering may be slow or fail"
            );
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Output of the most recent successful run
    pub fn last_output(&self) -> Option<Arc<RgbaImage>> {
        self.last_output.clone()
    }

    /// Admit a run: requires a source and no run in flight
    pub fn begin_run(&mut self) -> Result<RenderJob> {
        let source = self.source.clone().ok_or(OutlineError::SourceUnavailable)?;
        if self.processing {
            return Err(OutlineError::AlreadyProcessing);
        }
        self.processing = true;
        Ok(RenderJob {
            source,
            params: self.params,
            renderer: Arc::clone(&self.renderer),
        })
    }

    /// Close the active run; failures leave the previous output in place
    pub fn finish_run(&mut self, outcome: Result<OutlineResult>) -> Result<OutlineResult> {
        self.processing = false;
        match outcome {
            Ok(result) => {
                self.last_output = Some(Arc::clone(&result.image));
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "render failed; keeping previous output");
                Err(e)
            }
        }
    }

    /// Run synchronously on the calling thread
    pub fn render_now(&mut self) -> Result<OutlineResult> {
        let job = self.begin_run()?;
        let outcome = job.run();
        self.finish_run(outcome)
    }

    /// Apply a command; only `Render` produces a result
    pub fn execute(&mut self, command: SessionCommand) -> Result<Option<OutlineResult>> {
        match command {
            SessionCommand::SetThickness { thickness } => self.set_thickness(thickness),
            SessionCommand::SetSmoothing { smoothing } => self.set_smoothing(smoothing),
            SessionCommand::SetColor { color } => self.set_color(color),
            SessionCommand::Render => return self.render_now().map(Some),
        }
        Ok(None)
    }
}

impl Default for OutlineSession {
    fn default() -> Self {
        Self::new()
    }
}
