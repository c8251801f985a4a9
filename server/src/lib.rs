//! Skiff Deployment Server Library
//!
//! Core modules for skiffd: clone a git-hosted application, detect its
//! framework, install dependencies, build, launch, and serve it.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod models;
pub mod server;
pub mod storage;
pub mod transcript;
pub mod utils;
pub mod workers;
