//! Lumen progressive CPU path tracer.
//!
//! Drives repeated low-cost sample passes over a shared pixel buffer,
//! blending each pass into a running per-pixel mean so the image
//! converges while it is being displayed. A preview mode trades sample
//! budget for interaction latency so a fly camera stays responsive.

mod buffer;
mod integrator;
mod tracer;

pub use buffer::{shuffle_table, Pixel, PixelBuffer};
pub use integrator::{Progress, ProgressiveRenderer, RenderSettings};
pub use tracer::{PathTracer, BACKGROUND};

/// Re-export the scene and math types used at the rendering surface.
pub use lumen_math::{Ray, Vec2, Vec3};
pub use lumen_scene::{Camera, Light, Material, Scene, SceneObject, Shape};
