//! # Core Protocol Components
//!
//! Wire schema and the location primitives every call depends on.
//!
//! ## Components
//! - **Messages**: protobuf envelope, signature and payload schema
//! - **Location**: player position, canonical byte encoding, cell cover
//! - **Cell**: spatial cell identifiers along the Hilbert curve
//!
//! ## Wire Format
//! ```text
//! POST body = RequestEnvelope (protobuf)
//! reply     = ResponseEnvelope (protobuf), or relay JSON wrapping it in base64
//! ```

pub mod cell;
pub mod location;
pub mod messages;
