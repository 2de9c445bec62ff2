#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod traits;
pub mod types;

pub use dataset::Dataset;
pub use error::{Error, Result};
