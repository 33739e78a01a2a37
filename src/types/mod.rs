// Public modules
pub mod chat_request;
pub mod chat_response;
pub mod input_state;
pub mod message;
pub mod session_id;
pub mod transcript;

// Re-exports
pub use chat_request::ChatRequest;
pub use chat_response::ChatResponse;
pub use input_state::InputState;
pub use message::{Message, Origin};
pub use session_id::SessionId;
pub use transcript::Transcript;
