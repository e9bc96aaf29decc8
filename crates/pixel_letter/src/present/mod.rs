pub mod display;
pub mod export;
