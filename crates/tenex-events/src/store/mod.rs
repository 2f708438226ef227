pub mod inbox_store;
pub mod metadata_store;
pub mod operations_store;

pub use inbox_store::InboxStore;
pub use metadata_store::{BatchReport, ConversationMetadataStore, MetadataApplied, MetadataOutcome};
pub use operations_store::OperationsStore;
