pub mod backoff;
pub mod client;
pub mod decode;
pub mod errors;
pub mod session;
pub mod types;

pub use client::{Client, Fetch, FetchPolicy};
pub use errors::FetchError;
pub use types::{Document, DocumentKind, FetchRequest};
