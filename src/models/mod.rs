mod photo;
mod share;

pub use photo::*;
pub use share::*;
