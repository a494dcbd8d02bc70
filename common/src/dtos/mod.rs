mod convert;
pub use convert::*;

mod root;
pub use root::*;
