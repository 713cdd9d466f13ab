//! Backend HTTP API: wire types and the reqwest client wrapper.

pub mod api;
pub mod types;
