mod converter;
pub use converter::*;

mod pool;
pub use pool::*;
