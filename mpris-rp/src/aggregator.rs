//! Per-player playback-state aggregation
//!
//! The async half of player selection: query every discovered player's
//! `PlaybackStatus` so the pure grouping/selection in `presence_model` can
//! run over plain `(player, state)` pairs.

use mpris_discovery::{MprisError, Player};
use presence_model::PlaybackState;
use tracing::{debug, info};

/// Query each player's playback state, preserving discovery order.
///
/// An unparseable status maps to [`PlaybackState::Unknown`]. A player
/// whose service vanished between the sweep and the query is dropped;
/// any other bus error propagates, since its cause is unknown.
pub async fn playback_states(
    players: Vec<Player>,
) -> Result<Vec<(Player, PlaybackState)>, MprisError> {
    let mut states = Vec::with_capacity(players.len());
    for player in players {
        match player.player.playback_status().await {
            Ok(status) => {
                let state = PlaybackState::from_status(&status);
                debug!(player = %player.bus_name, status = %status, ?state, "polled player");
                states.push((player, state));
            }
            Err(err) => {
                let err = MprisError::classify(err);
                if err.is_service_unknown() {
                    info!(player = %player.bus_name, "player vanished during poll");
                    continue;
                }
                return Err(err);
            }
        }
    }
    Ok(states)
}
