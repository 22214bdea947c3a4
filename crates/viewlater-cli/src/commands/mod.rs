//! Command handlers

pub mod config;
pub mod group;
pub mod import;
pub mod link;
pub mod status;
