pub mod conversation_metadata;
pub mod event;
pub mod operations_status;
pub mod tag_utils;

pub use conversation_metadata::{ConversationMetadata, MetadataField, TimestampedValue};
pub use event::Event;
pub use operations_status::OperationSnapshot;
