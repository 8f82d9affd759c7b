pub mod apply;
pub mod fold;
pub mod grid;
pub mod registry;
pub mod sampler;
