pub mod cells;
pub mod sampler;
pub mod style;
