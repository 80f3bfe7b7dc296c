//! Ledger model: addresses, fungible tokens, and the asset registry.
//!
//! The ledger is an external collaborator from the protocol's point of view;
//! components consume it through a narrow balance/transfer/approve/burn
//! interface and never reach into token internals.

pub mod address;
pub mod registry;
pub mod token;

pub use address::Address;
pub use registry::Ledger;
pub use token::Token;
