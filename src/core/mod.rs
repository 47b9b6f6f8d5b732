pub mod components;
pub mod connections;
pub mod errors;
pub mod execution;
pub mod pin;
pub mod types;
