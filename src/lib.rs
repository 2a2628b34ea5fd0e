pub mod aggregate;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod engine;
pub mod formatter;
pub mod index;
pub mod mapper;
pub mod publish;
pub mod report;
pub mod spec;
pub mod store;
pub mod types;
