pub mod conversation;
pub mod record;

pub use conversation::{
    Conversation, PROTOCOL_VERSION, Role, SessionMetadata, TIMESTAMP_FORMAT, Turn,
};
pub use record::SessionRecord;
