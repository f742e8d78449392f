pub mod toml_loader;

pub use toml_loader::{load_all_requests, load_submission_request, load_users};
