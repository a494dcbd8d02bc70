pub mod dtos;
pub mod error;
pub mod models;
pub mod util;
pub mod validation;
