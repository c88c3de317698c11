//! API endpoints module.

pub mod responses;
pub mod welcome;

pub use responses::{add_response, clear_responses, get_response, list_responses, set_responses};
pub use welcome::{get_welcome, set_welcome};
