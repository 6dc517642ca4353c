//! Foundation types for weft, the component-level version control engine.
//!
//! This crate provides the identity and addressing types used throughout the
//! weft workspace. Every other weft crate depends on `weft-types`.
//!
//! # Key Types
//!
//! - [`ComponentId`] — scope + namespace path identity of a component, with an
//!   optional version reference
//! - [`ObjectHash`] — 160-bit content-addressed identifier (truncated BLAKE3)
//! - [`Lane`] — named head pointer enabling parallel history lines

pub mod component;
pub mod error;
pub mod hash;
pub mod lane;

pub use component::ComponentId;
pub use error::TypeError;
pub use hash::ObjectHash;
pub use lane::Lane;
