pub mod results;
pub mod tempfiles;
