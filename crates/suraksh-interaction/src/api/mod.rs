//! Backend API client.

mod client;

pub use client::SurakshApi;
