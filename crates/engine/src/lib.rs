//! Conversational business-directory resolution engine.
//!
//! Turns one chat/WhatsApp utterance into a ranked result envelope: session
//! handling with a fixed membership snapshot, intent resolution, hybrid
//! semantic/text search with a scope-shared query cache, and uniform
//! response assembly. Consumed by an upstream gateway; all datastore access
//! goes through injected collaborator traits.

mod config;
mod engine;
mod memory;

pub use config::{CacheSettings, EngineConfig, LinkSettings, SessionSettings};
pub use engine::DirectoryEngine;
pub use memory::MemoryDirectory;
