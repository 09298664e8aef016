//! Integration tests for askfile

mod artifact;
mod cancellation;
mod config_integration;
mod sources;
mod traversal;
