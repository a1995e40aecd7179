//! # Utility Modules
//!
//! Leaf capabilities the session engine is built on.
//!
//! ## Components
//! - **Crypto**: signature encryption (ChaCha20-Poly1305) and the disabled variant
//! - **Hash**: seeded 32/64-bit hashing (xxHash)
//! - **Time**: injectable millisecond clocks
//! - **Logging**: subscriber setup for applications
//!
//! ## Security
//! - Keys and session hashes come from the OS RNG (getrandom)

pub mod crypto;
pub mod hash;
pub mod logging;
pub mod time;

pub use crypto::{ChaChaCrypto, CryptoProvider, DisabledCrypto};
pub use hash::{HashProvider, XxHashProvider};
pub use time::{Clock, ManualClock, SystemClock};
