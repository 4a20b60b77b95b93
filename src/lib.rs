pub mod config;
pub mod navigation;
pub mod plan;
pub mod screens;
pub mod store;
pub mod utils;
