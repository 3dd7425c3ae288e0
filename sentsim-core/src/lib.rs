// sentsim-core: embedding, similarity and storage for the sentsim service.

pub mod config;
pub mod embedding;
pub mod service;
pub mod similarity;
pub mod store;

// Test utilities - always available for use by sentsim-server and tests
pub mod testutil;
