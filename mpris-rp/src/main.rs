//! Process bootstrap: configuration, logging, collaborators, sync loop.

use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info, warn};

use mpris_discovery::Mpris2;
use mpris_rp::config::Config;
use mpris_rp::logging;
use mpris_rp::sync::{PresenceSync, SyncError};

/// How long a shutdown waits for the close frame before dropping the
/// socket.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

enum Outcome {
    Finished(Result<(), SyncError>),
    Interrupted,
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logging::init(&config) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let mpris = match Mpris2::connect().await {
        Ok(mpris) => mpris,
        Err(err) => {
            error!(error = %err, "failed to connect to the session bus");
            return ExitCode::FAILURE;
        }
    };

    let mut sync = PresenceSync::new(mpris, config);
    let outcome = {
        let run = sync.run();
        tokio::pin!(run);
        tokio::select! {
            result = &mut run => Outcome::Finished(result),
            _ = tokio::signal::ctrl_c() => Outcome::Interrupted,
        }
    };

    match outcome {
        Outcome::Finished(Ok(())) => ExitCode::SUCCESS,
        Outcome::Finished(Err(err)) => {
            error!(error = %err, "sync loop terminated");
            ExitCode::FAILURE
        }
        Outcome::Interrupted => {
            info!("interrupt received, shutting down");
            if tokio::time::timeout(SHUTDOWN_GRACE, sync.close())
                .await
                .is_err()
            {
                warn!("close frame not delivered within the grace period");
            }
            ExitCode::SUCCESS
        }
    }
}
