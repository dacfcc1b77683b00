//! Core rendering engine.
//!
//! The [`Engine`] struct is the main entry point for the renderer. It owns
//! the camera, the scene graph, the asset store and the frame buffers, and
//! bridges per-frame input to the camera between renders.

use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::assets::{AssetStore, LoadError};
use crate::camera::{Camera, MoveKeys};
use crate::config::{AppConfig, CameraConfig, ObjectConfig};
use crate::math::vec3::Vec3;
use crate::render::{FrameStats, Renderer};
use crate::scene::{NodeId, SceneError, SceneGraph};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub struct Engine {
    renderer: Renderer,
    camera: Camera,
    scene: SceneGraph,
    assets: AssetStore,
    last_stats: FrameStats,
}

impl Engine {
    /// An empty scene viewed by a camera with default settings.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_camera(width, height, &CameraConfig::default())
    }

    fn with_camera(width: u32, height: u32, config: &CameraConfig) -> Self {
        let mut camera = Camera::new(config.fov_degrees.to_radians(), config.sensitivity, config.speed);
        camera.update_viewport(width, height);
        camera.set_position(Vec3::from(config.position));
        camera.set_orientation(config.yaw, config.pitch);

        Self {
            renderer: Renderer::new(width, height),
            camera,
            scene: SceneGraph::new(),
            assets: AssetStore::new(),
            last_stats: FrameStats::default(),
        }
    }

    /// Build the camera and load every configured object under the root.
    pub fn from_config(config: &AppConfig) -> Result<Self, EngineError> {
        let mut engine = Self::with_camera(config.window.width, config.window.height, &config.camera);
        for object in &config.objects {
            engine.add_object(object)?;
        }
        info!(
            "scene ready: {} nodes, {} meshes, {} textures",
            engine.scene.len(),
            engine.assets.mesh_count(),
            engine.assets.texture_count()
        );
        Ok(engine)
    }

    /// Load (or reuse) a mesh and attach it under `parent`.
    pub fn load_mesh(
        &mut self,
        path: impl AsRef<Path>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, EngineError> {
        let mesh = self.assets.load_mesh(path)?;
        Ok(self.scene.add_mesh(parent, mesh)?)
    }

    pub fn add_object(&mut self, object: &ObjectConfig) -> Result<NodeId, EngineError> {
        let root = self.scene.root();
        let id = self.load_mesh(&object.mesh, Some(root))?;
        self.scene.set_position(id, Vec3::from(object.position))?;
        self.scene.set_rotation(id, Vec3::from(object.rotation))?;
        self.scene.set_scale(id, object.scale)?;
        Ok(id)
    }

    /// Remove a node and release any assets nothing else uses.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), EngineError> {
        self.scene.remove(id)?;
        self.assets.purge_unused();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        debug!("viewport resized to {}x{}", width, height);
        self.camera.update_viewport(width, height);
        self.renderer.resize(width, height);
    }

    /// Apply one frame of input. `dt` is in milliseconds.
    pub fn update(&mut self, keys: &MoveKeys, mouse_delta: (f32, f32), dt: f32) {
        let (dx, dy) = mouse_delta;
        if dx != 0.0 || dy != 0.0 {
            self.camera.update_orientation(dx, dy);
        }
        self.camera.update_position(keys, dt);
    }

    pub fn render(&mut self) -> Result<FrameStats, SceneError> {
        self.last_stats = self.renderer.render(&self.scene, &self.camera)?;
        Ok(self.last_stats)
    }

    /// Returns the rendered frame as bytes (ARGB8888 format)
    pub fn frame_buffer(&self) -> &[u8] {
        self.renderer.as_bytes()
    }

    pub fn color_buffer(&self) -> &[u32] {
        self.renderer.color_buffer()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }
}
