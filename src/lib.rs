pub mod cameras;
pub mod dispatch;
pub mod factories;
pub mod fps;
pub mod framework;
pub mod helpers;
pub mod lighting;
pub mod mesh;
pub mod objects;
pub mod pipelines;
pub mod renderer;
pub mod scene;
pub mod shading;
pub mod state;

pub use glam;
pub use wgpu;

pub use egui;

pub use helpers::geometry;
