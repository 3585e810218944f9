//! The presence synchronisation loop
//!
//! One cooperative task drives everything: poll the bus, select the active
//! player, build the activity, diff it against the last value sent and ship
//! the difference. The loop also owns the transport's lifecycle —
//! Disconnected → Connecting → Connected — and re-enters Connecting
//! whenever the connection drops mid-tick.

use std::time::{SystemTime, UNIX_EPOCH};

use mpris_discovery::{Mpris2, MprisError, Player, TrackMetadata};
use presence_ipc::{IpcError, Transport};
use presence_model::{plan_update, Activity, PlaybackState, PlayerLike, PresenceUpdate};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::activity::build_activity;
use crate::aggregator;
use crate::config::Config;

/// Application id the presence assets are registered under.
pub const CLIENT_ID: &str = "435587535150907392";

/// Errors that terminate the sync loop.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An unexpected bus error. Its cause is unknown, so the loop reports
    /// failure instead of blindly retrying.
    #[error("discovery failed: {0}")]
    Discovery(#[from] MprisError),
}

/// One tick's failure, routed to the matching recovery.
#[derive(Debug, Error)]
enum TickError {
    #[error(transparent)]
    Connection(#[from] IpcError),
    #[error(transparent)]
    Discovery(#[from] MprisError),
}

/// Drives poll → select → build → diff → send against one presence
/// connection at a time.
///
/// All mutable state (active player, last-sent activity, the transport)
/// lives here, owned by the single task running [`PresenceSync::run`].
pub struct PresenceSync {
    mpris: Mpris2,
    config: Config,
    transport: Option<Transport>,
    /// Bus name of the player selected last tick
    active_player: Option<String>,
    /// Last activity that actually went over the wire
    last_activity: Option<Activity>,
    pid: u32,
}

impl PresenceSync {
    pub fn new(mpris: Mpris2, config: Config) -> Self {
        Self {
            mpris,
            config,
            transport: None,
            active_player: None,
            last_activity: None,
            pid: std::process::id(),
        }
    }

    /// Run until an unrecoverable error.
    pub async fn run(&mut self) -> Result<(), SyncError> {
        loop {
            let mut transport = match self.transport.take() {
                Some(transport) => transport,
                None => self.connect_presence().await,
            };
            match self.tick(&mut transport).await {
                Ok(()) => self.transport = Some(transport),
                Err(TickError::Connection(err)) => {
                    // drop the dead transport and re-enter Connecting
                    info!(error = %err, "connection to presence client lost, reconnecting");
                    continue;
                }
                Err(TickError::Discovery(err)) if err.is_service_unknown() => {
                    // a bus name went away mid-tick; the next sweep sorts it out
                    debug!(error = %err, "player service vanished during tick");
                    self.transport = Some(transport);
                    continue;
                }
                Err(TickError::Discovery(err)) => {
                    error!(error = %err, "unrecoverable discovery error during tick");
                    return Err(SyncError::Discovery(err));
                }
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    /// Best-effort teardown of the presence connection.
    pub async fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            transport.close().await;
        }
    }

    /// Retry the socket at a fixed interval until a handshake succeeds.
    async fn connect_presence(&self) -> Transport {
        loop {
            match Transport::connect(CLIENT_ID).await {
                Ok(transport) => {
                    info!("connected to presence client");
                    return transport;
                }
                Err(err) => debug!(error = %err, "presence client unavailable"),
            }
            tokio::time::sleep(self.config.reconnect_wait()).await;
        }
    }

    async fn tick(&mut self, transport: &mut Transport) -> Result<(), TickError> {
        let current = match self.resolve_active().await? {
            Some(player) => Some(self.build_current(&player).await?),
            None => {
                if let Some(previous) = self.active_player.take() {
                    info!(player = %previous, "player unselected");
                }
                None
            }
        };

        match plan_update(self.last_activity.as_ref(), current) {
            PresenceUpdate::Set(activity) => {
                let wire = serde_json::to_value(&activity)
                    .map_err(|err| IpcError::Protocol(format!("activity encoding: {err}")))?;
                let reply = transport.set_activity(self.pid, Some(wire)).await?;
                log_error_reply(&reply);
                self.last_activity = Some(activity);
            }
            PresenceUpdate::Clear => {
                let reply = transport.set_activity(self.pid, None).await?;
                log_error_reply(&reply);
                self.last_activity = None;
            }
            PresenceUpdate::Keep => debug!("activity unchanged, skipping send"),
        }
        Ok(())
    }

    /// Sweep the bus, poll playback states, pick the active player.
    async fn resolve_active(&mut self) -> Result<Option<Player>, TickError> {
        let players = self.mpris.players().await?;
        let states = aggregator::playback_states(players).await?;
        let active =
            presence_model::select_active(states, self.active_player.as_deref(), &self.config);
        if let Some(player) = &active {
            if self.active_player.as_deref() != Some(player.bus_name()) {
                info!(player = %player.bus_name(), identity = %player.identity, "selected player");
            }
            self.active_player = Some(player.bus_name().to_owned());
        }
        Ok(active)
    }

    /// Fetch the active player's properties and build the activity.
    ///
    /// Metadata and status are required; Position is best-effort, since
    /// several players never implement it.
    async fn build_current(&self, player: &Player) -> Result<Activity, TickError> {
        let (metadata, status, position) = tokio::join!(
            player.player.metadata(),
            player.player.playback_status(),
            player.player.position(),
        );
        let metadata = metadata.map_err(MprisError::classify)?;
        let status = status.map_err(MprisError::classify)?;
        let position = match position {
            Ok(position) => Some(position),
            Err(err) => {
                debug!(player = %player.bus_name, error = %err, "position unavailable");
                None
            }
        };

        let metadata = TrackMetadata::from_raw(&metadata);
        let state = PlaybackState::from_status(&status);
        let now_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or(0);
        let show_time = self.config.show_time(&player.identity);

        Ok(build_activity(
            &player.identity,
            &metadata,
            position,
            state,
            show_time,
            now_unix,
        ))
    }
}

/// Surface an ERROR reply from the presence client in the logs.
fn log_error_reply(reply: &Value) {
    if reply.get("evt").and_then(Value::as_str) == Some("ERROR") {
        let message = reply
            .pointer("/data/message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        error!(message, "presence client rejected the update");
    }
}
