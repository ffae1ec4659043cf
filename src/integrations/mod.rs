// src/integrations/mod.rs
//
// External Integrations Module
//
// - backend: transport traits consumed by the CatalogGateway
// - tmdb: reqwest implementation of CatalogBackend
// - openai: reqwest implementation of AssistantBackend

pub mod backend;
pub mod openai;
pub mod tmdb;

pub use backend::{
    AssistantBackend, CatalogBackend, CreateListResponse, SessionResponse, TokenResponse,
    TransportFailure,
};
pub use openai::client::{OpenAiClient, OpenAiClientConfig};
pub use tmdb::client::{TmdbClient, TmdbClientConfig};
