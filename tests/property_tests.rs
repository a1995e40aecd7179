//! Property-based tests using proptest
//!
//! These tests check the invariants the backend relies on across randomly
//! generated locations, tickets and request batches.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use pgo_protocol::config::ProtocolConstants;
use pgo_protocol::core::location::Location;
use pgo_protocol::core::messages::{AuthTicket, Request, RequestType, ResponseEnvelope};
use pgo_protocol::protocol::hashing;
use pgo_protocol::protocol::signature::{SignatureAssembler, SignatureContext};
use pgo_protocol::protocol::status;
use pgo_protocol::transport::relay;
use pgo_protocol::utils::hash::{HashProvider, XxHashProvider};
use pgo_protocol::utils::time::ManualClock;
use prost::Message;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

const SEED: u32 = 0x6124_7FBF;

fn location() -> impl Strategy<Value = Location> {
    (-85.0f64..85.0, -179.0f64..179.0, 0.0f64..100.0)
        .prop_map(|(lat, lon, acc)| Location::new(lat, lon, acc))
}

fn ticket() -> impl Strategy<Value = AuthTicket> {
    (
        prop::collection::vec(any::<u8>(), 1..64),
        any::<u64>(),
        prop::collection::vec(any::<u8>(), 1..64),
    )
        .prop_map(|(start, expire_timestamp_ms, end)| AuthTicket {
            start,
            expire_timestamp_ms,
            end,
        })
}

fn request_type() -> impl Strategy<Value = RequestType> {
    prop_oneof![
        Just(RequestType::GetPlayer),
        Just(RequestType::GetInventory),
        Just(RequestType::DownloadSettings),
        Just(RequestType::GetMapObjects),
        Just(RequestType::GetHatchedEggs),
        Just(RequestType::CheckAwardedBadges),
        Just(RequestType::CheckChallenge),
    ]
}

// Property: location bytes are a pure function of the location
proptest! {
    #[test]
    fn prop_location_bytes_deterministic(loc in location()) {
        let bytes = loc.to_bytes();
        prop_assert_eq!(bytes, loc.to_bytes());
        prop_assert_eq!(f64::from_be_bytes(bytes[0..8].try_into().unwrap()), loc.lat);
        prop_assert_eq!(f64::from_be_bytes(bytes[16..24].try_into().unwrap()), loc.accuracy);
    }
}

// Property: the ticket-chained location hash is never the hash of the concatenation
proptest! {
    #[test]
    fn prop_chained_hash_differs_from_concat(loc in location(), ticket in ticket()) {
        let hasher = XxHashProvider;
        let chained = hashing::location_hash1(&hasher, SEED, &ticket, &loc);

        let mut concat = ticket.encode_to_vec();
        concat.extend_from_slice(&loc.to_bytes());
        prop_assert_ne!(chained, hasher.hash32(SEED, &concat));
    }
}

// Property: the ticket-chained request hash is never the hash of the concatenation
proptest! {
    #[test]
    fn prop_request_hash_differs_from_concat(ticket in ticket(), kind in request_type()) {
        let hasher = XxHashProvider;
        let request = Request::bare(kind);
        let chained = hashing::request_hash(&hasher, SEED, &ticket, &request);

        let mut concat = ticket.encode_to_vec();
        concat.extend_from_slice(&request.encode_to_vec());
        prop_assert_ne!(chained, hasher.hash64(u64::from(SEED), &concat));
    }
}

// Property: request hashes follow request order one to one
proptest! {
    #[test]
    fn prop_request_hashes_follow_batch(
        ticket in ticket(),
        types in prop::collection::vec(request_type(), 0..10),
    ) {
        let hasher = XxHashProvider;
        let requests: Vec<Request> = types.into_iter().map(Request::bare).collect();
        let hashes = hashing::request_hashes(&hasher, SEED, &ticket, &requests);

        prop_assert_eq!(hashes.len(), requests.len());
        for (hash, request) in hashes.iter().zip(&requests) {
            prop_assert_eq!(*hash, hashing::request_hash(&hasher, SEED, &ticket, request));
        }
    }
}

// Property: same state, clock reading and RNG seed give identical plaintext
proptest! {
    #[test]
    fn prop_signature_deterministic(
        loc in location(),
        ticket in ticket(),
        rng_seed in any::<u64>(),
        started in 0u64..1_000_000,
        offset in 0u64..10_000_000,
    ) {
        let session_hash = [9u8; 32];
        let ctx = SignatureContext {
            ticket: &ticket,
            location: &loc,
            session_hash: &session_hash,
            started_ms: started,
        };
        let requests = vec![Request::bare(RequestType::GetPlayer)];
        let constants = ProtocolConstants::default();

        let sign = || {
            SignatureAssembler::new(
                Arc::new(XxHashProvider),
                Arc::new(ManualClock::new(started + offset)),
                Box::new(StdRng::seed_from_u64(rng_seed)),
            )
            .assemble(&ctx, &constants, &requests)
        };

        let a = sign();
        prop_assert_eq!(a.timestamp_since_start, offset);
        prop_assert_eq!(a.encode_to_vec(), sign().encode_to_vec());
    }
}

// Property: the cell cover is sorted and sized 2 * radius + 1
proptest! {
    #[test]
    fn prop_cell_cover_sorted(loc in location(), radius in 0usize..20) {
        let cells = loc.cell_ids(15, radius);
        prop_assert_eq!(cells.len(), 2 * radius + 1);
        prop_assert!(cells.windows(2).all(|w| w[0] <= w[1]));
    }
}

// Property: status classification is total and only the success family passes
proptest! {
    #[test]
    fn prop_status_classification_total(code in any::<i32>()) {
        let kind = status::classify(code);
        prop_assert_eq!(kind.is_none(), code == 1 || code == 2);

        let result = status::finish(ResponseEnvelope { status_code: code, ..Default::default() }, ());
        prop_assert_eq!(result.is_ok(), kind.is_none());
    }
}

// Property: relay unwrap never panics on arbitrary input
proptest! {
    #[test]
    fn prop_relay_unwrap_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = relay::unwrap(&data);
    }
}
