pub mod toml_loader;

pub use toml_loader::{list_test_ids, load_test_document};
