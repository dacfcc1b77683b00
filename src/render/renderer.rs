//! Owned color and depth buffers sized to the viewport.

use log::debug;

use super::frame::{render_frame, FrameStats};
use super::framebuffer::FrameBuffer;
use crate::camera::Camera;
use crate::colors;
use crate::scene::{SceneError, SceneGraph};

pub struct Renderer {
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![colors::SKY; size],
            depth_buffer: vec![f32::INFINITY; size],
            width,
            height,
        }
    }

    /// Reallocate both buffers. Previous contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!("resizing frame buffers to {}x{}", width, height);
        let size = (width * height) as usize;
        self.color_buffer = vec![colors::SKY; size];
        self.depth_buffer = vec![f32::INFINITY; size];
        self.width = width;
        self.height = height;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Render one frame of `scene` as seen by `camera`.
    ///
    /// The camera's viewport must match the buffer size.
    pub fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<FrameStats, SceneError> {
        debug_assert_eq!((camera.width(), camera.height()), (self.width, self.height));
        let mut buffer = self.as_framebuffer();
        render_frame(scene, camera, &mut buffer)
    }

    pub fn color_buffer(&self) -> &[u32] {
        &self.color_buffer
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth_buffer
    }

    /// The color buffer as ARGB8888 bytes in native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: u32 has no padding and a stricter alignment than u8; the
        // byte slice covers exactly the same allocation.
        unsafe {
            std::slice::from_raw_parts(
                self.color_buffer.as_ptr() as *const u8,
                self.color_buffer.len() * 4,
            )
        }
    }

    /// Get a mutable FrameBuffer view into the color and depth buffers.
    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            self.width,
            self.height,
        )
    }
}
