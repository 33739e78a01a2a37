// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;

// Re-exports
pub use chat::{ChatClient, SubmitOutcome};
pub use client::{ChatEndpoint, HttpEndpoint};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{TerminalView, View};
pub use types::*;
