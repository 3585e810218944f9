//! Active-player grouping and selection
//!
//! Turns the set of concurrently running players into at most one "active"
//! player per tick. Selection is pure: the async property fetches happen in
//! the sync loop, which hands `(player, state)` pairs in discovery order.

use std::collections::HashMap;

use crate::playback::PlaybackState;

/// Minimal view of a discovered player needed for selection.
pub trait PlayerLike {
    /// Bus identifier, unique per running player instance
    fn bus_name(&self) -> &str;
    /// Human-readable identity, the key for per-player configuration
    fn identity(&self) -> &str;
}

/// Per-player policy flags consulted during selection.
pub trait SelectionPolicy {
    /// Never select this player
    fn ignored(&self, identity: &str) -> bool;
    /// Allow selection while merely paused
    fn show_paused(&self, identity: &str) -> bool;
    /// Keep the previous selection alive after it stops
    fn show_stopped(&self, identity: &str) -> bool;
}

/// States eligible for direct selection, highest priority first.
const SELECTABLE: [PlaybackState; 2] = [PlaybackState::Playing, PlaybackState::Paused];

/// Partition players by playback state.
///
/// Every state is present in the result, discovery order is preserved
/// within each group, and no player is dropped or duplicated.
pub fn group_players<P: PlayerLike>(
    players: Vec<(P, PlaybackState)>,
) -> HashMap<PlaybackState, Vec<P>> {
    let mut groups: HashMap<PlaybackState, Vec<P>> = PlaybackState::ALL
        .iter()
        .map(|state| (*state, Vec::new()))
        .collect();
    for (player, state) in players {
        groups.entry(state).or_default().push(player);
    }
    groups
}

/// Select the active player for this tick.
///
/// `previous_active` is the bus name selected last tick; it is re-resolved
/// against the current sweep and cleared when the player is gone. The scan
/// walks the Playing then Paused groups in discovery order — deliberately
/// without re-sorting toward the previous selection — and falls back to the
/// previous player (any state) when its `show_stopped` flag allows it.
pub fn select_active<P: PlayerLike>(
    players: Vec<(P, PlaybackState)>,
    previous_active: Option<&str>,
    policy: &impl SelectionPolicy,
) -> Option<P> {
    let previous =
        previous_active.filter(|bus| players.iter().any(|(p, _)| p.bus_name() == *bus));

    let mut groups = group_players(players);
    for state in SELECTABLE {
        if let Some(group) = groups.get_mut(&state) {
            let eligible = |p: &P| {
                !policy.ignored(p.identity())
                    && (state == PlaybackState::Playing || policy.show_paused(p.identity()))
            };
            if let Some(index) = group.iter().position(eligible) {
                return Some(group.remove(index));
            }
        }
    }

    // No playing or paused player qualified; the previous selection may
    // hold on regardless of its current state.
    let bus = previous?;
    for group in groups.values_mut() {
        if let Some(index) = group.iter().position(|p| p.bus_name() == bus) {
            let player = group.remove(index);
            if policy.show_stopped(player.identity()) {
                return Some(player);
            }
            return None;
        }
    }
    None
}
