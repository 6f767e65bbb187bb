//! # Outline Compositor Library
//!
//! Draws a solid-color outline of configurable thickness and softness around
//! the opaque region of an RGBA image, composites the original on top and
//! crops the result to the outline.
//!
//! ## Pipeline
//!
//! 1. **Geometry**: blur radius, safety margin and working-canvas size
//! 2. **Alpha extraction** into an oversized single-channel field
//! 3. **Blur** of the field (Gaussian by default) as an approximate dilation
//! 4. **Threshold** back to a hard 0/255 mask
//! 5. **Bounds** of the mask for auto-cropping
//! 6. **Compositing**: fill, clip to the mask, draw the source on top
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use outline::{OutlinePipeline, OutlineParameters, RgbColor};
//!
//! let source = outline::io::load_png("sticker.png")?;
//! let params = OutlineParameters::default()
//!     .with_thickness(250.0)
//!     .with_color(RgbColor::WHITE);
//!
//! let result = OutlinePipeline::default().process(&source, &params)?;
//! outline::io::save_png(&result.image, "sticker_outlined.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Interactive use
//!
//! An [`OutlineSession`] holds the loaded image, the current parameters and
//! the last good output. [`RenderScheduler`] debounces parameter changes and
//! makes sure only one render runs at a time.

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;
pub mod session;
pub mod scheduler;

// Re-exports for convenience
pub use error::{OutlineError, Result};
pub use types::*;
pub use traits::*;
pub use algorithms::{BlurMethod, BoxBlur, GaussianBlur};
pub use pipeline::{OutlinePipeline, builder::PipelineBuilder};
pub use session::{OutlineSession, RenderJob, SessionCommand};
pub use scheduler::{RenderScheduler, RenderStatus, DEFAULT_DEBOUNCE};
