//! Signature Assembler
//!
//! Builds the encrypted anti-automation signature attached to every authenticated
//! call. The backend checks the structure, not just the length, so the field set and
//! the timestamp arithmetic below are fixed:
//!
//! ```text
//! t        = clock.now_ms()
//! elapsed  = t - session start
//! hashes   = [hash64(hash64(seed, ticket), request) for request in batch]
//! loc1     = hash32(hash32(seed, ticket), location bytes)
//! loc2     = hash32(seed, location bytes)
//! iv       = crypto.create_iv(elapsed as u32)
//! platform = SEND_ENCRYPTED_SIGNATURE(encrypt(signature, iv))
//! ```
//!
//! Randomness and time are injected, so two assemblies from the same state, batch,
//! clock reading and RNG seed produce identical bytes before encryption.

use crate::config::ProtocolConstants;
use crate::core::location::Location;
use crate::core::messages::{
    ActivityStatus, AuthTicket, LocationFix, PlatformRequest, PlatformRequestType, Request,
    SendEncryptedSignatureRequest, SensorInfo, Signature,
};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::hashing;
use crate::utils::crypto::CryptoProvider;
use crate::utils::hash::HashProvider;
use crate::utils::time::Clock;
use prost::Message;
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Location provider reported in the synthetic fix
const FIX_PROVIDER: &str = "network";

/// Session state the signature commits to, borrowed for one call
#[derive(Debug, Clone, Copy)]
pub struct SignatureContext<'a> {
    pub ticket: &'a AuthTicket,
    pub location: &'a Location,
    pub session_hash: &'a [u8],
    pub started_ms: u64,
}

/// Assembles and seals per-call signatures
pub struct SignatureAssembler {
    hasher: Arc<dyn HashProvider>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
}

impl SignatureAssembler {
    pub fn new(
        hasher: Arc<dyn HashProvider>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self { hasher, clock, rng }
    }

    /// Build the plaintext signature for `requests`
    pub fn assemble(
        &mut self,
        ctx: &SignatureContext<'_>,
        constants: &ProtocolConstants,
        requests: &[Request],
    ) -> Signature {
        let t = self.clock.now_ms();
        let elapsed = t.saturating_sub(ctx.started_ms);
        let hasher = self.hasher.as_ref();
        let seed = constants.hash_seed;

        let request_hash = hashing::request_hashes(hasher, seed, ctx.ticket, requests);
        let location_hash1 = hashing::location_hash1(hasher, seed, ctx.ticket, ctx.location);
        let location_hash2 = hashing::location_hash2(hasher, seed, ctx.location);

        let location_fix = self.location_fix(ctx.location, elapsed, constants);
        let sensor_info = self.sensor_info(elapsed, constants);

        Signature {
            request_hash,
            location_hash1: location_hash1 as i32,
            location_hash2: location_hash2 as i32,
            session_hash: ctx.session_hash.to_vec(),
            timestamp: t,
            timestamp_since_start: elapsed,
            unknown25: constants.signature_unknown25,
            location_fix: vec![location_fix],
            sensor_info: vec![sensor_info],
            activity_status: Some(ActivityStatus {
                stationary: true,
                ..Default::default()
            }),
        }
    }

    /// Assemble, encrypt and wrap the signature as the call's single platform request
    #[instrument(skip_all, fields(requests = requests.len()))]
    pub fn seal(
        &mut self,
        ctx: &SignatureContext<'_>,
        constants: &ProtocolConstants,
        requests: &[Request],
        crypto: &dyn CryptoProvider,
    ) -> Result<PlatformRequest> {
        let signature = self.assemble(ctx, constants, requests);
        debug!(?signature, "request signature");

        let plaintext = signature.encode_to_vec();
        let iv = crypto.create_iv(signature.timestamp_since_start as u32);
        let encrypted_signature = crypto.encrypt(&plaintext, &iv).map_err(|e| match e {
            ProtocolError::Formatting(_) => e,
            other => ProtocolError::Formatting(format!(
                "{}: {other}",
                constants::ERR_SIGNATURE_ENCRYPT
            )),
        })?;

        let request_message = SendEncryptedSignatureRequest {
            encrypted_signature,
        }
        .encode_to_vec();

        Ok(PlatformRequest {
            r#type: PlatformRequestType::SendEncryptedSignature.into(),
            request_message,
        })
    }

    fn location_fix(
        &mut self,
        location: &Location,
        elapsed: u64,
        constants: &ProtocolConstants,
    ) -> LocationFix {
        LocationFix {
            provider: FIX_PROVIDER.to_string(),
            timestamp_snapshot: elapsed,
            altitude: constants.fix_altitude,
            latitude: location.lat as f32,
            longitude: location.lon as f32,
            speed: self.rng.random_range(0..15u32) as f32,
            course: self.rng.random_range(0..360u32) as f32,
            horizontal_accuracy: self.rng.random::<f32>(),
            vertical_accuracy: self.rng.random::<f32>(),
            provider_status: constants.fix_provider_status,
            floor: 0,
            location_type: constants.fix_location_type,
        }
    }

    fn sensor_info(&mut self, elapsed: u64, constants: &ProtocolConstants) -> SensorInfo {
        let rng = &mut self.rng;
        SensorInfo {
            timestamp_snapshot: elapsed,
            linear_acceleration_x: rng.random(),
            linear_acceleration_y: rng.random(),
            linear_acceleration_z: rng.random(),
            magnetic_field_x: rng.random(),
            magnetic_field_y: rng.random(),
            magnetic_field_z: rng.random(),
            magnetic_field_accuracy: constants.sensor_magnetic_accuracy,
            attitude_pitch: rng.random(),
            attitude_yaw: rng.random(),
            altitude: rng.random(),
            rotation_rate_x: rng.random(),
            rotation_rate_y: rng.random(),
            rotation_rate_z: rng.random(),
            gravity_x: rng.random(),
            gravity_y: rng.random(),
            gravity_z: rng.random(),
            status: constants.sensor_status,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::core::messages::RequestType;
    use crate::utils::crypto::ChaChaCrypto;
    use crate::utils::hash::XxHashProvider;
    use crate::utils::time::ManualClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assembler(seed: u64, now: u64) -> SignatureAssembler {
        SignatureAssembler::new(
            Arc::new(XxHashProvider),
            Arc::new(ManualClock::new(now)),
            Box::new(StdRng::seed_from_u64(seed)),
        )
    }

    fn ticket() -> AuthTicket {
        AuthTicket {
            start: b"start".to_vec(),
            expire_timestamp_ms: 2_000_000,
            end: b"end".to_vec(),
        }
    }

    #[test]
    fn test_fields_follow_session_state() {
        let ticket = ticket();
        let location = Location::new(52.52, 13.405, 8.0);
        let session_hash = [0xAB; 32];
        let ctx = SignatureContext {
            ticket: &ticket,
            location: &location,
            session_hash: &session_hash,
            started_ms: 1_000_000,
        };
        let requests = vec![
            Request::bare(RequestType::GetPlayer),
            Request::bare(RequestType::CheckChallenge),
        ];
        let constants = ProtocolConstants::default();

        let sig = assembler(1, 1_004_500).assemble(&ctx, &constants, &requests);

        assert_eq!(sig.timestamp, 1_004_500);
        assert_eq!(sig.timestamp_since_start, 4_500);
        assert_eq!(sig.request_hash.len(), 2);
        assert_eq!(sig.session_hash, session_hash.to_vec());
        assert_eq!(sig.unknown25, constants.signature_unknown25);

        let fix = &sig.location_fix[0];
        assert_eq!(sig.location_fix.len(), 1);
        assert_eq!(fix.provider, "network");
        assert_eq!(fix.timestamp_snapshot, 4_500);
        assert_eq!(fix.latitude, 52.52f32);
        assert!(fix.speed >= 0.0 && fix.speed < 15.0);
        assert!(fix.course >= 0.0 && fix.course < 360.0);
        assert!(fix.horizontal_accuracy >= 0.0 && fix.horizontal_accuracy < 1.0);

        let sensor = &sig.sensor_info[0];
        assert_eq!(sig.sensor_info.len(), 1);
        assert_eq!(sensor.timestamp_snapshot, 4_500);
        assert_eq!(sensor.magnetic_field_accuracy, 1);
        assert_eq!(sensor.status, 3);

        let activity = sig.activity_status.expect("activity status");
        assert!(activity.stationary);
        assert!(!activity.walking);
    }

    #[test]
    fn test_same_inputs_same_plaintext() {
        let ticket = ticket();
        let location = Location::new(1.0, 2.0, 3.0);
        let session_hash = [7u8; 32];
        let ctx = SignatureContext {
            ticket: &ticket,
            location: &location,
            session_hash: &session_hash,
            started_ms: 10,
        };
        let requests = vec![Request::bare(RequestType::GetInventory)];
        let constants = ProtocolConstants::default();

        let a = assembler(42, 5_000).assemble(&ctx, &constants, &requests);
        let b = assembler(42, 5_000).assemble(&ctx, &constants, &requests);
        assert_eq!(a.encode_to_vec(), b.encode_to_vec());

        let c = assembler(43, 5_000).assemble(&ctx, &constants, &requests);
        assert_ne!(a.encode_to_vec(), c.encode_to_vec());
    }

    #[test]
    fn test_seal_encrypts_with_elapsed_iv() {
        let ticket = ticket();
        let location = Location::new(1.0, 2.0, 3.0);
        let session_hash = [1u8; 32];
        let ctx = SignatureContext {
            ticket: &ticket,
            location: &location,
            session_hash: &session_hash,
            started_ms: 100,
        };
        let requests = vec![Request::bare(RequestType::GetPlayer)];
        let constants = ProtocolConstants::default();
        let crypto = ChaChaCrypto::new(&[5u8; 32]);

        let platform = assembler(9, 1_100)
            .seal(&ctx, &constants, &requests, &crypto)
            .expect("seal");
        assert_eq!(
            platform.r#type,
            i32::from(PlatformRequestType::SendEncryptedSignature)
        );

        let carrier = SendEncryptedSignatureRequest::decode(platform.request_message.as_slice())
            .expect("carrier");
        assert_eq!(
            &carrier.encrypted_signature[..12],
            crypto.create_iv(1_000).as_slice()
        );

        let plaintext = crypto
            .decrypt(&carrier.encrypted_signature)
            .expect("decrypt");
        let expected = assembler(9, 1_100).assemble(&ctx, &constants, &requests);
        assert_eq!(plaintext, expected.encode_to_vec());
    }
}
