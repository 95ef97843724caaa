//! Document store - the normalized entity table.
//!
//! Documents reach the store through the transport: every request or
//! subscription result is normalized into a scratch table, and the scratch
//! table is merged into the live one `type -> id` at a time. A payload with
//! no identity-bearing objects leaves the store untouched and silent.
//!
//! ```text
//!   transport ──result──► normalize ──► scratch ──merge──► live table ──► notify
//! ```

mod store;

pub use store::DocumentStore;
