//! # Session Engine
//!
//! Owns the per-session state (credentials, location, API URL, session hash) and
//! runs every call through the same pipeline:
//!
//! ```text
//! build envelope -> sign (ticket held + crypto enabled) -> transport -> decode slots
//!                -> push to feed -> classify status
//! ```
//!
//! The ticket is never refreshed automatically. Callers watch [`Session::is_expired`]
//! and run [`Session::init`] again when it turns true.
//!
//! Calls take `&mut self`, so one session is driven by one task at a time; share it
//! behind a `tokio::sync::Mutex` when several tasks need it.

use crate::config::SessionConfig;
use crate::core::location::Location;
use crate::core::messages::{
    AuthTicket, CheckChallengeResponse, DownloadSettingsMessage, GetInventoryMessage,
    GetInventoryResponse, GetMapObjectsMessage, GetMapObjectsResponse, GetPlayerResponse,
    Request, RequestType, ResponseEnvelope,
};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::envelope::{self, Credentials};
use crate::protocol::signature::{SignatureAssembler, SignatureContext};
use crate::protocol::status;
use crate::service::auth::AuthProvider;
use crate::service::feed::{FeedItem, FeedSink, NullFeed};
use crate::transport::{CallContext, HttpTransport, Transport};
use crate::utils::crypto::{CryptoProvider, DisabledCrypto};
use crate::utils::hash::{HashProvider, XxHashProvider};
use crate::utils::time::{Clock, SystemClock};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Reply slot of GET_MAP_OBJECTS in the announce batch
const MAP_OBJECTS_SLOT: usize = 5;

/// Reply slot of CHECK_CHALLENGE in the announce batch
const CHALLENGE_SLOT: usize = 6;

/// Length of the per-session random hash
pub const SESSION_HASH_LEN: usize = 32;

/// Where the session stands with its credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    Unauthenticated,
    Authenticated,
    Expired,
}

/// Builder for [`Session`]. Every collaborator has a production default.
pub struct SessionBuilder {
    provider: Box<dyn AuthProvider>,
    location: Location,
    config: SessionConfig,
    transport: Option<Box<dyn Transport>>,
    crypto: Arc<dyn CryptoProvider>,
    hasher: Arc<dyn HashProvider>,
    clock: Arc<dyn Clock>,
    feed: Arc<dyn FeedSink>,
    rng: Option<Box<dyn RngCore + Send>>,
}

impl SessionBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn crypto(mut self, crypto: Arc<dyn CryptoProvider>) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn hasher(mut self, hasher: Arc<dyn HashProvider>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn feed(mut self, feed: Arc<dyn FeedSink>) -> Self {
        self.feed = feed;
        self
    }

    /// Randomness for the signature's synthetic sensor readings
    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn build(self) -> Result<Session> {
        self.config.validate_strict()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(&self.config.transport)?),
        };
        let rng = match self.rng {
            Some(rng) => rng,
            None => Box::new(StdRng::from_os_rng()),
        };

        let started_ms = self.clock.now_ms();
        let signer = SignatureAssembler::new(self.hasher, Arc::clone(&self.clock), rng);

        Ok(Session {
            config: self.config,
            transport,
            provider: self.provider,
            crypto: self.crypto,
            feed: self.feed,
            clock: self.clock,
            signer,
            location: self.location,
            ticket: None,
            started_ms,
            session_hash: [0u8; SESSION_HASH_LEN],
            url: None,
        })
    }
}

/// One authenticated conversation with the backend
pub struct Session {
    config: SessionConfig,
    transport: Box<dyn Transport>,
    provider: Box<dyn AuthProvider>,
    crypto: Arc<dyn CryptoProvider>,
    feed: Arc<dyn FeedSink>,
    clock: Arc<dyn Clock>,
    signer: SignatureAssembler,
    location: Location,
    ticket: Option<AuthTicket>,
    started_ms: u64,
    session_hash: [u8; SESSION_HASH_LEN],
    url: Option<String>,
}

impl Session {
    pub fn builder(provider: impl AuthProvider + 'static, location: Location) -> SessionBuilder {
        SessionBuilder {
            provider: Box::new(provider),
            location,
            config: SessionConfig::default(),
            transport: None,
            crypto: Arc::new(DisabledCrypto),
            hasher: Arc::new(XxHashProvider),
            clock: Arc::new(SystemClock),
            feed: Arc::new(NullFeed),
            rng: None,
        }
    }

    /// True when no ticket is held or the held ticket's expiry has passed
    pub fn is_expired(&self) -> bool {
        match &self.ticket {
            Some(ticket) => ticket.expire_timestamp_ms <= self.clock.now_ms(),
            None => true,
        }
    }

    pub fn state(&self) -> TicketState {
        match self.ticket {
            None => TicketState::Unauthenticated,
            Some(_) if self.is_expired() => TicketState::Expired,
            Some(_) => TicketState::Authenticated,
        }
    }

    pub fn ticket(&self) -> Option<&AuthTicket> {
        self.ticket.as_ref()
    }

    /// Endpoint calls currently go to
    pub fn api_url(&self) -> &str {
        self.url
            .as_deref()
            .unwrap_or(&self.config.transport.default_url)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn session_hash(&self) -> &[u8] {
        &self.session_hash
    }

    pub fn started_ms(&self) -> u64 {
        self.started_ms
    }

    /// Update the reported position; later calls carry it
    pub fn move_to(&mut self, location: Location) {
        debug!(lat = location.lat, lon = location.lon, "session moved");
        self.location = location;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.transport.set_timeout(timeout);
    }

    /// Log in through the provider and bootstrap the session.
    ///
    /// On success the API URL and ticket are replaced. When the bootstrap reply
    /// carries no API URL this fails with [`ProtocolError::NoUrl`] and the session
    /// keeps whatever ticket it held before.
    #[instrument(skip_all)]
    pub async fn init(&mut self, ctx: &CallContext, relay_id: Option<&str>) -> Result<()> {
        ctx.run(self.provider.login(ctx)).await?;

        // replaced only alongside the ticket
        let mut session_hash = [0u8; SESSION_HASH_LEN];
        getrandom::fill(&mut session_hash).map_err(|e| {
            ProtocolError::Formatting(format!("{}: {e}", constants::ERR_SESSION_HASH))
        })?;

        let requests = self.bootstrap_requests(Request::bare(RequestType::GetInventory));
        let response = self.exchange(ctx, requests, relay_id, false).await?;

        if response.api_url.is_empty() {
            warn!("bootstrap reply carried no api url");
            return Err(ProtocolError::NoUrl);
        }

        let url = resolve_url(&response.api_url);
        if response.auth_ticket.is_none() {
            warn!("bootstrap reply carried no auth ticket");
        }
        info!(
            url = %url,
            expires_ms = response.auth_ticket.as_ref().map(|t| t.expire_timestamp_ms),
            "session initialised"
        );
        self.url = Some(url);
        self.ticket = response.auth_ticket;
        self.session_hash = session_hash;
        Ok(())
    }

    /// Send an arbitrary batch, signed when a ticket is held and crypto is enabled
    pub async fn call(
        &mut self,
        ctx: &CallContext,
        requests: Vec<Request>,
        relay_id: Option<&str>,
    ) -> Result<ResponseEnvelope> {
        self.exchange(ctx, requests, relay_id, true).await
    }

    #[instrument(skip_all)]
    pub async fn get_player(
        &mut self,
        ctx: &CallContext,
        relay_id: Option<&str>,
    ) -> Result<GetPlayerResponse> {
        let requests = vec![Request::bare(RequestType::GetPlayer)];
        let response = self.call(ctx, requests, relay_id).await?;

        let player: GetPlayerResponse = envelope::decode_slot(&response, 0)?;
        debug!(?player, "player reply");
        self.feed.push(FeedItem::Player(player.clone()));

        status::finish(response, player)
    }

    #[instrument(skip_all)]
    pub async fn get_inventory(
        &mut self,
        ctx: &CallContext,
        relay_id: Option<&str>,
    ) -> Result<GetInventoryResponse> {
        let requests = vec![Request::bare(RequestType::GetInventory)];
        let response = self.call(ctx, requests, relay_id).await?;

        let inventory: GetInventoryResponse = envelope::decode_slot(&response, 0)?;
        debug!(?inventory, "inventory reply");
        self.feed.push(FeedItem::Inventory(inventory.clone()));

        status::finish(response, inventory)
    }

    /// Report presence at the current location and fetch the surrounding map cells.
    ///
    /// A raised challenge flag fails the call with [`ProtocolError::ChallengeShown`]
    /// even when the envelope status is a success.
    #[instrument(skip_all)]
    pub async fn announce(
        &mut self,
        ctx: &CallContext,
        relay_id: Option<&str>,
    ) -> Result<GetMapObjectsResponse> {
        let protocol = &self.config.protocol;
        let cell_id = self
            .location
            .cell_ids(protocol.cell_level, protocol.cell_radius);
        let map_message = GetMapObjectsMessage {
            since_timestamp_ms: vec![0; cell_id.len()],
            cell_id,
            latitude: self.location.lat,
            longitude: self.location.lon,
        };

        // second precision, the backend rejects sub-second inventory timestamps
        let last_timestamp_ms = (self.clock.now_ms() / 1000 * 1000) as i64;
        let inventory = Request::with_message(
            RequestType::GetInventory,
            &GetInventoryMessage {
                last_timestamp_ms,
                item_been_seen: 0,
            },
        );

        let mut requests = self.bootstrap_requests(inventory);
        requests.push(Request::with_message(RequestType::GetMapObjects, &map_message));
        requests.push(Request::bare(RequestType::CheckChallenge));

        let response = self.call(ctx, requests, relay_id).await?;

        let map_objects: GetMapObjectsResponse =
            envelope::decode_slot(&response, MAP_OBJECTS_SLOT)?;
        debug!(cells = map_objects.map_cells.len(), "map objects reply");
        self.feed.push(FeedItem::MapObjects(map_objects.clone()));

        let challenge: CheckChallengeResponse = envelope::decode_slot(&response, CHALLENGE_SLOT)?;
        if challenge.show_challenge {
            warn!(url = %challenge.challenge_url, "challenge shown");
            return Err(ProtocolError::ChallengeShown {
                url: challenge.challenge_url,
            });
        }

        status::finish(response, map_objects)
    }

    /// Same batch as [`Session::announce`]
    pub async fn get_player_map(
        &mut self,
        ctx: &CallContext,
        relay_id: Option<&str>,
    ) -> Result<GetMapObjectsResponse> {
        self.announce(ctx, relay_id).await
    }

    /// GET_PLAYER, GET_HATCHED_EGGS, GET_INVENTORY, CHECK_AWARDED_BADGES, DOWNLOAD_SETTINGS
    fn bootstrap_requests(&self, inventory: Request) -> Vec<Request> {
        let settings = DownloadSettingsMessage {
            hash: self.config.protocol.settings_hash.clone(),
        };
        vec![
            Request::bare(RequestType::GetPlayer),
            Request::bare(RequestType::GetHatchedEggs),
            inventory,
            Request::bare(RequestType::CheckAwardedBadges),
            Request::with_message(RequestType::DownloadSettings, &settings),
        ]
    }

    async fn exchange(
        &mut self,
        ctx: &CallContext,
        requests: Vec<Request>,
        relay_id: Option<&str>,
        use_ticket: bool,
    ) -> Result<ResponseEnvelope> {
        let ticket = if use_ticket { self.ticket.as_ref() } else { None };

        let credentials = match ticket {
            Some(ticket) => Credentials::Ticket(ticket),
            None => Credentials::Token {
                provider: self.provider.provider_string(),
                token: self.provider.access_token(),
            },
        };
        let mut request =
            envelope::build(&self.config.protocol, &self.location, credentials, requests);

        if let Some(ticket) = ticket {
            if self.crypto.enabled() {
                let signing = SignatureContext {
                    ticket,
                    location: &self.location,
                    session_hash: &self.session_hash,
                    started_ms: self.started_ms,
                };
                let platform = self.signer.seal(
                    &signing,
                    &self.config.protocol,
                    &request.requests,
                    self.crypto.as_ref(),
                )?;
                request.platform_requests = vec![platform];
            }
        }

        debug!(
            types = ?request.requests.iter().map(|r| r.request_type).collect::<Vec<_>>(),
            signed = !request.platform_requests.is_empty(),
            ticket = request.auth_ticket.is_some(),
            lat = request.latitude,
            lon = request.longitude,
            "request envelope"
        );
        let endpoint = self.api_url().to_string();
        self.transport
            .send(ctx, &endpoint, &request, relay_id)
            .await
    }
}

/// Turn the bootstrap `api_url` into a full endpoint
fn resolve_url(api_url: &str) -> String {
    if api_url.starts_with("https://") || api_url.starts_with("http://") {
        api_url.to_string()
    } else {
        format!("https://{api_url}/rpc")
    }
}
