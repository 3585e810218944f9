//! Typed proxies for the MPRIS2 D-Bus interfaces
//!
//! Only the properties the presence engine consumes are declared; the
//! MPRIS control methods are out of scope here.

use std::collections::HashMap;

use zbus::zvariant::{OwnedObjectPath, OwnedValue};

/// Root interface: application-level identification.
#[zbus::proxy(
    interface = "org.mpris.MediaPlayer2",
    default_path = "/org/mpris/MediaPlayer2"
)]
pub trait MediaPlayer2 {
    /// Human-readable application name, e.g. "VLC media player"
    #[zbus(property)]
    fn identity(&self) -> zbus::Result<String>;
}

/// Playback status and track metadata.
#[zbus::proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2"
)]
pub trait Player {
    /// "Playing", "Paused" or "Stopped"
    #[zbus(property)]
    fn playback_status(&self) -> zbus::Result<String>;

    /// Raw metadata map (xesam:/mpris: keys)
    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    /// Position in microseconds. Optional in the wild; several browsers
    /// do not expose it at all.
    #[zbus(property)]
    fn position(&self) -> zbus::Result<i64>;
}

/// Optional capability group: the player exposes its upcoming tracks.
#[zbus::proxy(
    interface = "org.mpris.MediaPlayer2.TrackList",
    default_path = "/org/mpris/MediaPlayer2"
)]
pub trait TrackList {
    #[zbus(property)]
    fn tracks(&self) -> zbus::Result<Vec<OwnedObjectPath>>;
}

/// Optional capability group: the player exposes named playlists.
#[zbus::proxy(
    interface = "org.mpris.MediaPlayer2.Playlists",
    default_path = "/org/mpris/MediaPlayer2"
)]
pub trait Playlists {
    #[zbus(property)]
    fn playlist_count(&self) -> zbus::Result<u32>;
}
