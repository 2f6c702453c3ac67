//! Versioned DTOs for persisted configuration.

mod client_config;

pub use client_config::{
    CLIENT_CONFIG_VERSION, ClientConfigDTO, ClientConfigV1_0_0, ClientConfigV1_1_0,
    create_client_config_migrator,
};
