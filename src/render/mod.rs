pub mod component;
pub mod renderer;

pub use component::{RenderedComponent, RenderedOutput};
pub use renderer::{ComponentRenderer, Renderer};
