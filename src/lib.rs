pub mod cli;
pub mod config;
pub mod constants;
pub mod deploy;
pub mod packager;
pub mod platform;
pub mod registry;
pub mod service;

pub use anyhow::Result;
