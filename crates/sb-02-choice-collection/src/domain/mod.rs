//! Domain layer: scopes, requests, collected results and errors.

pub mod choices;
pub mod errors;
pub mod request;
pub mod scope;
