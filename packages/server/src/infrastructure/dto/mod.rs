//! Data Transfer Objects (DTOs) for the relay server.
//!
//! - WebSocket events are the shared `hibiki_shared::protocol` types;
//!   `conversion` maps domain events onto them.
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
