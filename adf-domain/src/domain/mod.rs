pub mod configuration;
pub mod error;
pub mod pipeline;

pub use configuration::*;
pub use error::*;
pub use pipeline::*;
