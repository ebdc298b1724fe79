// cache

mod cache;

pub use cache::*;
