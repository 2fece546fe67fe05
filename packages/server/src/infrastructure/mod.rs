//! Infrastructure layer: concrete implementations of the domain ports.

pub mod dto;
pub mod generator;
pub mod pusher;
pub mod registry;
