pub mod bind_group;
pub use bind_group::BindGroupFactory;

pub mod render_pass;
pub use render_pass::RenderPassFactory;

pub mod render_pipeline;
pub use render_pipeline::{DepthConfig, RenderPipelineFactory};

pub mod texture;
pub use texture::{DepthTextureFactory, MultisampleTextureFactory, TextureBundle};
