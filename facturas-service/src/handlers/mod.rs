//! HTTP handlers: extract the request context, call a service, serialize.

pub mod auth;
pub mod clients;
pub mod company;
pub mod documents;
pub mod services;
pub mod workspaces;
