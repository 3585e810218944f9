//! Discord rich presence for MPRIS2 media players
//!
//! Bridges two local protocols: MPRIS2 over the session bus (source of
//! player state) and the Discord IPC socket (sink for presence updates).
//! Every poll tick the sync loop sweeps the bus for players, picks one
//! sticky "active" player, renders its metadata into a budgeted activity
//! and ships it over the presence transport — but only when it actually
//! changed.
//!
//! Layering:
//!
//! ```text
//! mpris-rp (config, logging, sync loop, activity construction)
//!     ↓                                ↓
//! mpris-discovery (session bus)    presence-ipc (unix socket)
//!     ↘                                ↙
//!          presence-model (pure state/selection/formatting)
//! ```

pub mod activity;
pub mod aggregator;
pub mod config;
pub mod logging;
pub mod sync;
