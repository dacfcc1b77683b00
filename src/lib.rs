//! A CPU software rasterizer driven by a scene graph.
//!
//! Meshes are placed in a tree of groups, each node carrying a local
//! transform. Every frame the tree is walked from the root, transforms are
//! accumulated, and each mesh face is projected, culled and filled into a
//! color and depth buffer. SDL2 is used only to show the result and collect
//! input (behind the `window` feature).
//!
//! # Quick Start
//!
//! ```ignore
//! use softscene::prelude::*;
//!
//! let mut engine = Engine::new(800, 600);
//! let root = engine.scene().root();
//! let tree = engine.load_mesh("assets/tree.obj", Some(root))?;
//! engine.scene_mut().set_scale(tree, 10.0)?;
//! engine.render()?;
//! ```

// Public API - exposed to library consumers
pub mod assets;
pub mod camera;
pub mod colors;
pub mod config;
pub mod engine;
pub mod light;
pub mod material;
pub mod math;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod texture;
pub mod transform;
#[cfg(feature = "window")]
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use assets::{AssetStore, LoadError};
pub use engine::{Engine, EngineError};
pub use mesh::Mesh;
pub use render::{render_frame, FrameBuffer, FrameStats, Renderer};
pub use scene::{NodeId, SceneError, SceneGraph};
pub use transform::Transform;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use softscene::prelude::*;
/// ```
pub mod prelude {
    // Camera
    pub use crate::camera::{Camera, Direction, MoveKeys};

    // Engine & configuration
    pub use crate::config::AppConfig;
    pub use crate::engine::{Engine, EngineError};

    // Scene
    pub use crate::scene::{NodeId, NodeKind, SceneError, SceneGraph};
    pub use crate::transform::Transform;

    // Assets
    pub use crate::assets::AssetStore;
    pub use crate::material::Material;
    pub use crate::mesh::{Face, MaterialSpan, Mesh, Vertex};
    pub use crate::texture::Texture;

    // Math
    pub use crate::math::mat3::Mat3;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;

    // Rendering
    pub use crate::render::{render_frame, FrameBuffer, FrameStats};

    // Window & Input
    #[cfg(feature = "window")]
    pub use crate::window::{FrameLimiter, InputState, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{
        rasterize_mesh, rasterize_with_shader, FlatShader, FrameBuffer, FrameStats,
        MaterialShader,
    };
}
