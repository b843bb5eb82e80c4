//! HTTP handlers

pub mod health;
pub mod index;
pub mod predict;
pub mod status;
