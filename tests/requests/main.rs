//! Integration tests for the request store.

mod support;
mod interceptors;
