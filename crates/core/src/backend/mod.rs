pub mod http;

pub use http::{error_detail, HttpBackend};
