//! Request and response types crossing the router boundary

mod message;
mod request;
mod response;

pub use message::{Message, Role};
pub use request::GenerationRequest;
pub use response::GenerationResponse;
