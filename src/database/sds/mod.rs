pub mod sds_base;

pub use sds_base::*;
