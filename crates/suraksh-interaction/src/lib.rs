//! Network layer of the Suraksh client: the credential-aware transport and
//! the typed backend API client built on it.

pub mod api;
pub mod transport;

pub use api::SurakshApi;
pub use transport::{ApiRequest, RequestBody, RequestOptions, TransportClient, TransportResponse};
