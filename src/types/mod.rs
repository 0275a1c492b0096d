//! Core type definitions using newtype patterns for type safety.
//!
//! A `ServerBinding` can only be built from a validated address and port,
//! so there is no partially-populated binding state.

mod address;
mod binding;

pub use address::AddressLiteral;
pub use binding::{parse_port, split_host_port, ServerBinding};
