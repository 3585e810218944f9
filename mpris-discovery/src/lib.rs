//! MPRIS2 player discovery over the session bus
//!
//! Enumerates the `org.mpris.MediaPlayer2.*` bus names and hands out
//! [`Player`] snapshots with typed property access to the root and player
//! interfaces (plus the optional tracklist/playlists groups). Property
//! access is explicit and typed; anything a player does not support
//! surfaces as a distinguishable error kind instead of a stringly-typed
//! bus error.

mod discovery;
mod error;
mod metadata;
mod proxy;

pub use discovery::{Mpris2, Player};
pub use error::MprisError;
pub use metadata::TrackMetadata;
pub use proxy::{MediaPlayer2Proxy, PlayerProxy, PlaylistsProxy, TrackListProxy};
