//! CPU rasterization of a scene graph into caller-owned buffers.

mod frame;
mod framebuffer;
mod rasterizer;
mod renderer;

pub use frame::{render_frame, FrameStats};
pub use framebuffer::FrameBuffer;
pub use rasterizer::{
    barycentric, rasterize_face, rasterize_mesh, rasterize_with_shader, signed_area,
    BoundingBox, FaceOutcome, FaceRenderData, FlatShader, MaterialShader, PixelShader,
};
pub use renderer::Renderer;
