pub mod astro;
pub mod cli;
pub mod config;
pub mod consts;
pub mod error;
pub mod gui;
pub mod logging;
pub mod math;
pub mod model;
