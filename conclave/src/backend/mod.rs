//! Backend call layer: wire types, transport seam, retrying client, fan-out.

pub mod client;
pub mod confidence;
pub mod fanout;
pub mod transport;
pub mod types;

pub use client::{BackendClient, RetryPolicy};
pub use confidence::extract_confidence;
pub use fanout::{BackendCall, FanOut};
pub use transport::{CompletionTransport, HttpTransport};
pub use types::{ChatCompletion, ChatMessage, ChatRequest, ModelInfo};
