//! Core model for mirroring media-player state onto a rich-presence display.
//!
//! This crate is deliberately free of any bus or socket dependency: it holds
//! the playback-state model, the active-player selection algorithm, the
//! fixed-budget text formatter and the activity diffing step. The async
//! collaborators (MPRIS discovery, the presence transport) live in sibling
//! crates and feed their data through the types defined here.

mod activity;
mod playback;
mod select;
mod text;
mod time;

pub use activity::{plan_update, Activity, Assets, PresenceUpdate, Timestamps};
pub use playback::PlaybackState;
pub use select::{group_players, select_active, PlayerLike, SelectionPolicy};
pub use text::{format_budgeted, shorten};
pub use time::format_timestamp;
