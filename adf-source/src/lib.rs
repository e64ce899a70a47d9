pub mod activity;
pub mod client;
pub mod domain;
pub mod source;

pub use crate::client::ManagementClient;
pub use crate::source::AdfSource;
