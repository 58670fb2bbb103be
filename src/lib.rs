//! # Climate Globe
//!
//! A wgpu-rendered globe whose surface color, glow and polar caps follow a
//! climate time series.
//!
//! ## Quick Start
//!
//! ```ignore
//! use climate_globe::prelude::*;
//!
//! fn main() -> Result<(), GlobeError> {
//!     Viewer::new()
//!         .with_mode(ViewMode::Interactive)
//!         .with_category(Some(Category::Cryosphere))
//!         .with_index(4)
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Modes
//!
//! - **Ambient**: the globe and starfield spin slowly on their own.
//! - **Interactive**: the globe can also be dragged with the mouse, eases toward
//!   the dragged orientation, and shows polar caps when the cryosphere is
//!   selected.
//!
//! ### Data mapping
//!
//! A [`Dataset`] holds a few labelled periods and, per [`Category`], series of
//! values indexed in lockstep with the periods. [`map_index_to_visuals`] turns a
//! `(category, index)` pair into a [`VisualParams`] set. It always starts from
//! the reset set, so switching category never leaves anything behind:
//!
//! ```ignore
//! let data = Dataset::reference();
//! let params = map_index_to_visuals(&data, Some(Category::Atmosphere), 4);
//! assert!(params.emissive.x > 0.0);
//! ```
//!
//! ### Lifecycle
//!
//! A [`Mount`] owns at most one live [`SceneHandle`]. Activating a scene tears
//! the previous one down first; deactivating cancels the render loop before the
//! GPU surface is released. The GPU backend sits behind the [`SurfaceFactory`]
//! and [`RenderSurface`] traits, so the lifecycle can be driven without a GPU.
//!
//! ## Feature Flags
//!
//! - `egui`: an overlay panel for picking mode, category and period.

pub mod dataset;
pub mod error;
pub mod gpu;
pub mod input;
pub mod lifecycle;
pub mod mesh;
pub mod render_loop;
pub mod rotation;
pub mod scene;
pub mod shader;
pub mod starfield;
pub mod viewer;
pub mod viewport;
pub mod visuals;

pub use dataset::{Category, Dataset};
pub use error::{DatasetError, GlobeError, GpuError};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::camera::Camera;
pub use gpu::{GpuSurface, WgpuFactory};
pub use input::{DragController, PointerEvent, PointerInput};
pub use lifecycle::{FrameData, Mount, RenderSurface, SceneHandle, SceneOptions, SurfaceFactory};
pub use render_loop::{AnimationHandle, FrameOutcome, LoopState, RenderLoop};
pub use rotation::{RotationState, ViewMode};
pub use scene::SceneGraph;
pub use starfield::StarfieldConfig;
pub use viewer::Viewer;
pub use viewport::Viewport;
pub use visuals::{map_index_to_visuals, VisualParams};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use climate_globe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::dataset::{Category, Dataset};
    pub use crate::error::GlobeError;
    pub use crate::rotation::ViewMode;
    pub use crate::starfield::StarfieldConfig;
    pub use crate::viewer::Viewer;
    pub use crate::visuals::{map_index_to_visuals, VisualParams};
    pub use glam::{Vec2, Vec3, Vec4};
}
