//! Domain layer: value objects, entities and the ports implemented by the
//! infrastructure layer.

pub mod chunk_stream;
pub mod entity;
pub mod error;
pub mod pusher;
pub mod registry;
pub mod value_object;

pub use chunk_stream::{ChunkStream, TextGenerator, with_pull_timeout};
pub use entity::{InboundMessage, OutboundEvent, Participant};
pub use error::{GenerationError, PushError, RegistryError, ValueObjectError};
pub use pusher::{DeliveryReport, EventPusher, PusherChannel, deliver};
pub use registry::SessionRegistry;
pub use value_object::{DisplayName, ParticipantId, RoomName, Timestamp};
