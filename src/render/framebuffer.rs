//! Frame buffer abstraction for 2D pixel access.
//!
//! Provides a view into caller-owned color and depth buffers. The depth
//! buffer enables hidden surface removal via the z-buffer algorithm.

/// A view into color and depth buffers.
///
/// Wraps 1D slices with width/height metadata to enable 2D pixel access.
/// This is a borrowed view, not an owning type - it's meant to be created
/// temporarily when you need to pass buffers + dimensions together.
///
/// # Depth Buffer
///
/// The depth buffer stores camera-space depth (distance along the view
/// normal). Smaller values are closer; a cleared buffer holds `+inf`.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    depth_buffer: &'a mut [f32],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    /// Create a new FrameBuffer view from buffer slices and dimensions.
    ///
    /// Both slices must hold exactly `width * height` elements. This is only
    /// checked in debug builds.
    pub fn new(
        color_buffer: &'a mut [u32],
        depth_buffer: &'a mut [f32],
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(
            color_buffer.len(),
            (width * height) as usize,
            "Color buffer size doesn't match dimensions"
        );
        debug_assert_eq!(
            depth_buffer.len(),
            (width * height) as usize,
            "Depth buffer size doesn't match dimensions"
        );
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill the color buffer with `color` and reset every depth to `+inf`.
    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
        self.depth_buffer.fill(f32::INFINITY);
    }

    /// Depth-tested write.
    ///
    /// If `depth` is strictly closer than the stored value, the depth is
    /// updated and `shade` is evaluated to produce the color. Ties keep the
    /// existing pixel. Coordinates must be inside the buffer.
    ///
    /// Returns whether the pixel was written.
    #[inline]
    pub fn set_pixel_with_depth<F>(&mut self, x: u32, y: u32, depth: f32, shade: F) -> bool
    where
        F: FnOnce() -> u32,
    {
        let idx = (y * self.width + x) as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.color_buffer[idx] = shade();
            true
        } else {
            false
        }
    }

    /// Get the color at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        (x < self.width && y < self.height)
            .then(|| self.color_buffer[(y * self.width + x) as usize])
    }

    /// Get the depth at (x, y), or None if out of bounds.
    #[inline]
    pub fn get_depth(&self, x: u32, y: u32) -> Option<f32> {
        (x < self.width && y < self.height)
            .then(|| self.depth_buffer[(y * self.width + x) as usize])
    }
}
