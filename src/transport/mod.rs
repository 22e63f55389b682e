//! Server transports: stdio (primary) and HTTP.

pub mod http;
pub mod stdio;
