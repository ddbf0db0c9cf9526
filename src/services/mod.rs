pub mod deletion;
pub mod media_storage;
pub mod session_state;
