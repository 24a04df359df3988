pub mod auth;
pub mod client;
pub mod composer;
pub mod display;
pub mod error;
pub mod media;
pub mod models;
pub mod oauth;
pub mod session;
pub mod transport;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
pub use media::MediaFile;
pub use session::{CredentialStore, FileStore, MemoryStore, Session};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
