mod cache_store_memory;

pub use cache_store_memory::*;
