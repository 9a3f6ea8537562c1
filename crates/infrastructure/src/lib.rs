//! Gateway adapters for the dashboard's CRUD port.

#![forbid(unsafe_code)]

mod envelope;
mod http_crud_gateway;
mod in_memory_crud_gateway;

pub use http_crud_gateway::HttpCrudGateway;
pub use in_memory_crud_gateway::InMemoryCrudGateway;
