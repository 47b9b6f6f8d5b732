pub mod validator;
pub mod wire;

// Re-export commonly used types
pub use validator::ConnectionValidator;
pub use wire::{Wire, WireScope};
