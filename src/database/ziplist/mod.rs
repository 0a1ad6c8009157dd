pub mod ziplist_base;

pub use ziplist_base::*;
