//! Session-bus enumeration and player snapshot construction

use std::collections::HashMap;

use presence_model::PlayerLike;
use tracing::{debug, warn};
use zbus::proxy::CacheProperties;
use zbus::Connection;

use crate::error::MprisError;
use crate::proxy::{MediaPlayer2Proxy, PlayerProxy, PlaylistsProxy, TrackListProxy};

/// Well-known bus-name prefix claimed by every MPRIS2 player.
const BUS_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// One discovered player: identification plus its capability proxies.
///
/// Handed out fresh on every poll sweep; cloning is cheap since the
/// proxies share the underlying connection.
#[derive(Debug, Clone)]
pub struct Player {
    /// Bus-name suffix uniquely identifying this player instance
    pub bus_name: String,
    /// Human-readable identity, e.g. "VLC media player"
    pub identity: String,
    /// Root capability group (application identification)
    pub root: MediaPlayer2Proxy<'static>,
    /// Playback capability group (status, metadata, position)
    pub player: PlayerProxy<'static>,
    /// Optional tracklist capability group
    pub tracklist: Option<TrackListProxy<'static>>,
    /// Optional playlists capability group
    pub playlists: Option<PlaylistsProxy<'static>>,
}

impl PlayerLike for Player {
    fn bus_name(&self) -> &str {
        &self.bus_name
    }

    fn identity(&self) -> &str {
        &self.identity
    }
}

/// Discovery handle over the session bus.
///
/// Proxy sets are cached per bus name so a player that stays alive across
/// sweeps is not rebuilt every tick; entries whose name disappeared from
/// the bus are dropped on the next sweep.
#[derive(Debug)]
pub struct Mpris2 {
    connection: Connection,
    dbus: zbus::fdo::DBusProxy<'static>,
    cache: HashMap<String, Player>,
}

impl Mpris2 {
    /// Connect to the session bus.
    pub async fn connect() -> Result<Self, MprisError> {
        let connection = Connection::session().await?;
        let dbus = zbus::fdo::DBusProxy::new(&connection)
            .await
            .map_err(|err| MprisError::classify(err.into()))?;
        Ok(Self {
            connection,
            dbus,
            cache: HashMap::new(),
        })
    }

    /// Bus-name suffixes of all currently running players, in bus order.
    pub async fn player_ids(&self) -> Result<Vec<String>, MprisError> {
        let names = self
            .dbus
            .list_names()
            .await
            .map_err(|err| MprisError::classify(err.into()))?;
        Ok(names
            .iter()
            .filter_map(|name| name.as_str().strip_prefix(BUS_PREFIX).map(str::to_owned))
            .collect())
    }

    /// Build (or reuse) the snapshot for one player id.
    pub async fn player(&mut self, bus_name: &str) -> Result<Player, MprisError> {
        if let Some(cached) = self.cache.get(bus_name) {
            return Ok(cached.clone());
        }
        let destination = format!("{BUS_PREFIX}{bus_name}");

        let root = MediaPlayer2Proxy::builder(&self.connection)
            .destination(destination.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;
        let player = PlayerProxy::builder(&self.connection)
            .destination(destination.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;
        let tracklist = TrackListProxy::builder(&self.connection)
            .destination(destination.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;
        let playlists = PlaylistsProxy::builder(&self.connection)
            .destination(destination)?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        // One concurrent round-trip: identity is required, the optional
        // capability groups are probed and dropped where unsupported.
        let (identity, tracks, playlist_count) = futures::join!(
            root.identity(),
            tracklist.tracks(),
            playlists.playlist_count(),
        );
        let identity = match identity {
            Ok(identity) => identity,
            Err(err) => {
                return Err(match MprisError::classify(err) {
                    MprisError::UnsupportedInterface(_) => {
                        MprisError::MissingProperties(bus_name.to_owned())
                    }
                    other => other,
                })
            }
        };
        let tracklist = tracks.is_ok().then_some(tracklist);
        let playlists = playlist_count.is_ok().then_some(playlists);

        let snapshot = Player {
            bus_name: bus_name.to_owned(),
            identity,
            root,
            player,
            tracklist,
            playlists,
        };
        self.cache.insert(bus_name.to_owned(), snapshot.clone());
        Ok(snapshot)
    }

    /// Snapshot every currently running player, in discovery order.
    ///
    /// A player that vanishes or misbehaves mid-sweep is logged and
    /// skipped; only enumerating the bus itself can fail.
    pub async fn players(&mut self) -> Result<Vec<Player>, MprisError> {
        let ids = self.player_ids().await?;
        // invalidate cache entries whose bus name is gone
        self.cache.retain(|bus_name, _| ids.contains(bus_name));

        let mut players = Vec::with_capacity(ids.len());
        for id in ids {
            match self.player(&id).await {
                Ok(player) => {
                    debug!(player = %id, identity = %player.identity, "discovered player");
                    players.push(player);
                }
                Err(err) => warn!(player = %id, error = %err, "skipping player"),
            }
        }
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_prefix_stripping() {
        let names = [
            "org.mpris.MediaPlayer2.vlc",
            "org.freedesktop.Notifications",
            "org.mpris.MediaPlayer2.firefox.instance123",
        ];
        let ids: Vec<&str> = names
            .iter()
            .filter_map(|n| n.strip_prefix(BUS_PREFIX))
            .collect();
        assert_eq!(ids, ["vlc", "firefox.instance123"]);
    }
}
