pub mod builder;
pub mod config;
pub mod corpus;
pub mod cosine;
pub mod embedding;
pub mod error;
pub mod event_log;
pub mod index;
pub mod persistence;
pub mod protocol;
pub mod recommender;
pub mod server;
pub mod transport;
pub mod types;
