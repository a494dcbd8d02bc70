//! Upload side of docstron: picks a file, checks it against the upload
//! policy, sends it for conversion while reporting progress, and fetches the
//! converted result.

pub mod candidate;
pub mod error;
pub mod session;
pub mod upload;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
