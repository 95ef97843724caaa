//! Integration tests for the Api facade.

mod support;
mod bindings;
mod persistence;
