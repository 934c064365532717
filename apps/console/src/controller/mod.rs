//! Controller layer: operator commands, intent dispatch and text rendering.

pub mod commands;
pub mod orchestration;
pub mod view;
