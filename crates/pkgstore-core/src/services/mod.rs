//! Core services.
//!
//! Services orchestrate domain logic over the ports; they never touch
//! processes or sockets directly.

mod session_registry;
mod stream_session;

pub use session_registry::{SessionLease, SessionRegistry};
pub use stream_session::{
    EventStream, SessionController, StreamRequest, StreamSession,
};
