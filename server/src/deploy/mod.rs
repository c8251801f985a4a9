//! Deployment pipeline

pub mod exec;
pub mod fsm;
pub mod git;
pub mod installer;
pub mod manifest;
pub mod pipeline;
pub mod profiles;
pub mod registry;
pub mod runner;
pub mod workspace;
