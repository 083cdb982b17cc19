pub mod catalog;
pub mod host;

#[allow(unused_imports)]
pub use catalog::*;
#[allow(unused_imports)]
pub use host::*;
