//! # Signed Session Protocol
//!
//! Everything between a typed request batch and the bytes on the wire.
//!
//! ## Components
//! - **Envelope**: request envelope construction, positional reply slots
//! - **Hashing**: ticket-chained request and location hashes
//! - **Signature**: the encrypted per-call fingerprint
//! - **Status**: response status classification
//!
//! ## Call Flow
//! ```text
//! requests -> envelope::build -> [signature::seal if ticket && crypto enabled]
//!          -> transport -> status::accept -> envelope::decode_slot(i) -> status::finish
//! ```

pub mod envelope;
pub mod hashing;
pub mod signature;
pub mod status;
