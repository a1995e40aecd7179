//! Hash chains committed to by the signature.
//!
//! Chaining means hashing the first input and feeding the result in as the seed for
//! the second. It is not a hash of the concatenation, and the backend can tell.

use crate::core::location::Location;
use crate::core::messages::{AuthTicket, Request};
use crate::utils::hash::HashProvider;
use prost::Message;

/// 64-bit hash of one outgoing request, chained through the ticket
pub fn request_hash(
    hasher: &dyn HashProvider,
    seed: u32,
    ticket: &AuthTicket,
    request: &Request,
) -> u64 {
    let ticket_hash = hasher.hash64(u64::from(seed), &ticket.encode_to_vec());
    hasher.hash64(ticket_hash, &request.encode_to_vec())
}

/// One hash per request, in request order
pub fn request_hashes(
    hasher: &dyn HashProvider,
    seed: u32,
    ticket: &AuthTicket,
    requests: &[Request],
) -> Vec<u64> {
    requests
        .iter()
        .map(|request| request_hash(hasher, seed, ticket, request))
        .collect()
}

/// 32-bit location hash chained through the ticket
pub fn location_hash1(
    hasher: &dyn HashProvider,
    seed: u32,
    ticket: &AuthTicket,
    location: &Location,
) -> u32 {
    let ticket_hash = hasher.hash32(seed, &ticket.encode_to_vec());
    hasher.hash32(ticket_hash, &location.to_bytes())
}

/// 32-bit location hash straight from the seed, independent of authentication
pub fn location_hash2(hasher: &dyn HashProvider, seed: u32, location: &Location) -> u32 {
    hasher.hash32(seed, &location.to_bytes())
}
