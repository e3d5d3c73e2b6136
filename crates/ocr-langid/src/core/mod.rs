//! Core configuration and request orchestration.

pub mod config;
pub mod pipeline;
pub mod upload;
