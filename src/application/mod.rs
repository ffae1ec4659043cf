// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - This layer sits ABOVE services and engines
// - It owns construction and startup, nothing else
// - The presentation layer observes the engines it exposes

pub mod state;

pub use state::{CatalogApp, Collaborators};
