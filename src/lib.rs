pub mod config;
pub mod errors;
pub mod jx_config;
pub mod lifecycle;
pub mod registry;
pub mod runner;
pub mod toolchain;
pub mod tracker;
pub mod ui;
