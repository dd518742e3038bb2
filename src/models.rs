mod author;
mod book;

pub use author::*;
pub use book::*;
