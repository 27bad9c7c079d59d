pub mod gateway_client;
pub mod response;
pub mod test_source;

pub use gateway_client::GatewayClient;
pub use test_source::{ConfiguredTestSource, HttpTestSource, TestSource, TomlTestSource};
