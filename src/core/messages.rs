//! # Wire Schema
//!
//! Protobuf messages exchanged with the RPC backend.
//!
//! The backend's schema is fixed; field tags below must match it exactly or the
//! server silently drops the field. Game payloads (player, inventory, map cells) are
//! decoded only as far as the session engine needs; nested game objects stay as
//! raw bytes so unknown content survives decoding untouched.
//!
//! ## Envelope
//! ```text
//! RequestEnvelope  = status_code, request_id, requests[], platform_requests[],
//!                    latitude, longitude, accuracy, auth_info | auth_ticket,
//!                    ms_since_last_locationfix
//! ResponseEnvelope = status_code, request_id, api_url, platform_returns[],
//!                    auth_ticket, returns[] (positional), error
//! ```

use prost::Message;

/// Sub-request type carried in [`Request::request_type`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum RequestType {
    MethodUnset = 0,
    GetPlayer = 2,
    GetInventory = 4,
    DownloadSettings = 5,
    GetMapObjects = 106,
    GetHatchedEggs = 126,
    CheckAwardedBadges = 129,
    CheckChallenge = 600,
    VerifyChallenge = 601,
}

/// Platform-level side-channel request type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PlatformRequestType {
    MethodUnset = 0,
    SendEncryptedSignature = 6,
}

/// Envelope-level status returned by the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum StatusCode {
    Unknown = 0,
    Ok = 1,
    OkRpcUrlInResponse = 2,
    BadRequest = 3,
    InvalidRequest = 51,
    InvalidPlatformRequest = 52,
    Redirect = 53,
    SessionInvalidated = 100,
    InvalidAuthToken = 102,
}

/// Backend-issued session credential
#[derive(Clone, PartialEq, Message)]
pub struct AuthTicket {
    #[prost(bytes = "vec", tag = "1")]
    pub start: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub expire_timestamp_ms: u64,
    #[prost(bytes = "vec", tag = "3")]
    pub end: Vec<u8>,
}

/// Raw credentials, sent only until a ticket is held
#[derive(Clone, PartialEq, Message)]
pub struct AuthInfo {
    #[prost(string, tag = "1")]
    pub provider: String,
    #[prost(message, optional, tag = "2")]
    pub token: Option<AuthToken>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AuthToken {
    #[prost(string, tag = "1")]
    pub contents: String,
    #[prost(int32, tag = "2")]
    pub unknown2: i32,
}

/// One typed sub-request in a batch
#[derive(Clone, PartialEq, Message)]
pub struct Request {
    #[prost(enumeration = "RequestType", tag = "1")]
    pub request_type: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub request_message: Vec<u8>,
}

impl Request {
    /// Request without a payload
    pub fn bare(request_type: RequestType) -> Self {
        Self {
            request_type: request_type.into(),
            request_message: Vec::new(),
        }
    }

    /// Request carrying an encoded payload message
    pub fn with_message<M: Message>(request_type: RequestType, message: &M) -> Self {
        Self {
            request_type: request_type.into(),
            request_message: message.encode_to_vec(),
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct PlatformRequest {
    #[prost(enumeration = "PlatformRequestType", tag = "1")]
    pub r#type: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub request_message: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PlatformResponse {
    #[prost(enumeration = "PlatformRequestType", tag = "1")]
    pub r#type: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub response: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RequestEnvelope {
    #[prost(int32, tag = "1")]
    pub status_code: i32,
    #[prost(uint64, tag = "3")]
    pub request_id: u64,
    #[prost(message, repeated, tag = "4")]
    pub requests: Vec<Request>,
    #[prost(message, repeated, tag = "6")]
    pub platform_requests: Vec<PlatformRequest>,
    #[prost(double, tag = "7")]
    pub latitude: f64,
    #[prost(double, tag = "8")]
    pub longitude: f64,
    #[prost(int32, tag = "9")]
    pub accuracy: i32,
    #[prost(message, optional, tag = "10")]
    pub auth_info: Option<AuthInfo>,
    #[prost(message, optional, tag = "11")]
    pub auth_ticket: Option<AuthTicket>,
    #[prost(int64, tag = "12")]
    pub ms_since_last_locationfix: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ResponseEnvelope {
    #[prost(enumeration = "StatusCode", tag = "1")]
    pub status_code: i32,
    #[prost(uint64, tag = "2")]
    pub request_id: u64,
    #[prost(string, tag = "3")]
    pub api_url: String,
    #[prost(message, repeated, tag = "6")]
    pub platform_returns: Vec<PlatformResponse>,
    #[prost(message, optional, tag = "7")]
    pub auth_ticket: Option<AuthTicket>,
    #[prost(bytes = "vec", repeated, tag = "100")]
    pub returns: Vec<Vec<u8>>,
    #[prost(string, tag = "101")]
    pub error: String,
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Anti-automation fingerprint, encrypted before it leaves the process
#[derive(Clone, PartialEq, Message)]
pub struct Signature {
    #[prost(uint64, tag = "2")]
    pub timestamp_since_start: u64,
    #[prost(message, repeated, tag = "4")]
    pub location_fix: Vec<LocationFix>,
    #[prost(message, repeated, tag = "7")]
    pub sensor_info: Vec<SensorInfo>,
    #[prost(message, optional, tag = "9")]
    pub activity_status: Option<ActivityStatus>,
    #[prost(int32, tag = "10")]
    pub location_hash1: i32,
    #[prost(int32, tag = "20")]
    pub location_hash2: i32,
    #[prost(bytes = "vec", tag = "22")]
    pub session_hash: Vec<u8>,
    #[prost(uint64, tag = "23")]
    pub timestamp: u64,
    #[prost(uint64, repeated, tag = "24")]
    pub request_hash: Vec<u64>,
    #[prost(int64, tag = "25")]
    pub unknown25: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct LocationFix {
    #[prost(string, tag = "1")]
    pub provider: String,
    #[prost(uint64, tag = "2")]
    pub timestamp_snapshot: u64,
    #[prost(float, tag = "4")]
    pub altitude: f32,
    #[prost(float, tag = "13")]
    pub latitude: f32,
    #[prost(float, tag = "14")]
    pub longitude: f32,
    #[prost(float, tag = "18")]
    pub speed: f32,
    #[prost(float, tag = "20")]
    pub course: f32,
    #[prost(float, tag = "21")]
    pub horizontal_accuracy: f32,
    #[prost(float, tag = "22")]
    pub vertical_accuracy: f32,
    #[prost(uint64, tag = "26")]
    pub provider_status: u64,
    #[prost(uint32, tag = "27")]
    pub floor: u32,
    #[prost(uint64, tag = "28")]
    pub location_type: u64,
}

/// Synthetic device sensor reading.
///
/// Tag 12 is named `attitude_roll` in the published schema but the backend reads it
/// as altitude; it is named for what the server does with it.
#[derive(Clone, PartialEq, Message)]
pub struct SensorInfo {
    #[prost(uint64, tag = "1")]
    pub timestamp_snapshot: u64,
    #[prost(double, tag = "3")]
    pub linear_acceleration_x: f64,
    #[prost(double, tag = "4")]
    pub linear_acceleration_y: f64,
    #[prost(double, tag = "5")]
    pub linear_acceleration_z: f64,
    #[prost(double, tag = "6")]
    pub magnetic_field_x: f64,
    #[prost(double, tag = "7")]
    pub magnetic_field_y: f64,
    #[prost(double, tag = "8")]
    pub magnetic_field_z: f64,
    #[prost(int32, tag = "9")]
    pub magnetic_field_accuracy: i32,
    #[prost(double, tag = "10")]
    pub attitude_pitch: f64,
    #[prost(double, tag = "11")]
    pub attitude_yaw: f64,
    #[prost(double, tag = "12")]
    pub altitude: f64,
    #[prost(double, tag = "13")]
    pub rotation_rate_x: f64,
    #[prost(double, tag = "14")]
    pub rotation_rate_y: f64,
    #[prost(double, tag = "15")]
    pub rotation_rate_z: f64,
    #[prost(double, tag = "16")]
    pub gravity_x: f64,
    #[prost(double, tag = "17")]
    pub gravity_y: f64,
    #[prost(double, tag = "18")]
    pub gravity_z: f64,
    #[prost(int32, tag = "19")]
    pub status: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct ActivityStatus {
    #[prost(uint64, tag = "1")]
    pub start_time_ms: u64,
    #[prost(bool, tag = "2")]
    pub unknown_status: bool,
    #[prost(bool, tag = "3")]
    pub walking: bool,
    #[prost(bool, tag = "4")]
    pub running: bool,
    #[prost(bool, tag = "5")]
    pub stationary: bool,
    #[prost(bool, tag = "6")]
    pub automotive: bool,
    #[prost(bool, tag = "7")]
    pub tilting: bool,
    #[prost(bool, tag = "8")]
    pub cycling: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct SendEncryptedSignatureRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub encrypted_signature: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Message)]
pub struct DownloadSettingsMessage {
    #[prost(string, tag = "1")]
    pub hash: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetInventoryMessage {
    #[prost(int64, tag = "1")]
    pub last_timestamp_ms: i64,
    #[prost(int32, tag = "2")]
    pub item_been_seen: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetMapObjectsMessage {
    #[prost(uint64, repeated, tag = "1")]
    pub cell_id: Vec<u64>,
    #[prost(int64, repeated, tag = "2")]
    pub since_timestamp_ms: Vec<i64>,
    #[prost(double, tag = "3")]
    pub latitude: f64,
    #[prost(double, tag = "4")]
    pub longitude: f64,
}

// ---------------------------------------------------------------------------
// Reply payloads
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Message)]
pub struct PlayerData {
    #[prost(int64, tag = "1")]
    pub creation_timestamp_ms: i64,
    #[prost(string, tag = "2")]
    pub username: String,
    #[prost(int32, tag = "5")]
    pub team: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetPlayerResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub player_data: Option<PlayerData>,
    #[prost(bool, tag = "3")]
    pub banned: bool,
    #[prost(bool, tag = "4")]
    pub warn: bool,
}

/// Inventory entry; the item body stays encoded
#[derive(Clone, PartialEq, Message)]
pub struct InventoryItem {
    #[prost(int64, tag = "1")]
    pub modified_timestamp_ms: i64,
    #[prost(bytes = "vec", tag = "3")]
    pub inventory_item_data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct InventoryDelta {
    #[prost(int64, tag = "1")]
    pub original_timestamp_ms: i64,
    #[prost(int64, tag = "2")]
    pub new_timestamp_ms: i64,
    #[prost(message, repeated, tag = "3")]
    pub inventory_items: Vec<InventoryItem>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetInventoryResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub inventory_delta: Option<InventoryDelta>,
}

/// Map cell; the objects it contains stay encoded
#[derive(Clone, PartialEq, Message)]
pub struct MapCell {
    #[prost(uint64, tag = "1")]
    pub s2_cell_id: u64,
    #[prost(int64, tag = "2")]
    pub current_timestamp_ms: i64,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub forts: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "4")]
    pub spawn_points: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub wild_pokemons: Vec<Vec<u8>>,
    #[prost(string, repeated, tag = "6")]
    pub deleted_objects: Vec<String>,
    #[prost(bytes = "vec", repeated, tag = "10")]
    pub catchable_pokemons: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "11")]
    pub nearby_pokemons: Vec<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MapObjectsStatus {
    Unset = 0,
    Success = 1,
    LocationUnset = 2,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetMapObjectsResponse {
    #[prost(message, repeated, tag = "1")]
    pub map_cells: Vec<MapCell>,
    #[prost(enumeration = "MapObjectsStatus", tag = "2")]
    pub status: i32,
    #[prost(int32, tag = "3")]
    pub time_of_day: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct CheckChallengeResponse {
    #[prost(bool, tag = "1")]
    pub show_challenge: bool,
    #[prost(string, tag = "2")]
    pub challenge_url: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_bare_request_has_empty_payload() {
        let req = Request::bare(RequestType::GetPlayer);
        assert_eq!(req.request_type, 2);
        assert!(req.request_message.is_empty());
    }

    #[test]
    fn test_returns_decode_positionally() {
        let envelope = ResponseEnvelope {
            status_code: StatusCode::Ok.into(),
            returns: vec![b"first".to_vec(), Vec::new(), b"third".to_vec()],
            ..Default::default()
        };
        let decoded =
            ResponseEnvelope::decode(envelope.encode_to_vec().as_slice()).expect("decode");
        assert_eq!(decoded.returns.len(), 3);
        assert_eq!(decoded.returns[0], b"first");
        assert!(decoded.returns[1].is_empty());
        assert_eq!(decoded.returns[2], b"third");
    }

    #[test]
    fn test_unknown_status_value_survives_decode() {
        // A raw status the enum does not know must still decode into the i32 field
        let mut bytes = Vec::new();
        prost::encoding::int32::encode(1, &777, &mut bytes);
        let decoded = ResponseEnvelope::decode(bytes.as_slice()).expect("decode");
        assert_eq!(decoded.status_code, 777);
        assert!(StatusCode::try_from(decoded.status_code).is_err());
    }
}
