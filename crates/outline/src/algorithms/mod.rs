pub mod geometry;
pub mod extraction;
pub mod blur;
pub mod threshold;
pub mod bounds;
pub mod compositing;

pub use geometry::*;
pub use extraction::extract_alpha;
pub use blur::*;
pub use threshold::*;
pub use bounds::*;
pub use compositing::*;
