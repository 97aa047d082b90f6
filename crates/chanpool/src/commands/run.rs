//! `chanpool run`: the long-running controller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use chanpool_core::{ChannelApi, CoreError, GroupScheduler, WebQueryChannelApi};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let settings = super::load_settings(global)?;

    let api = tokio::select! {
        api = connect_with_retry(
            || WebQueryChannelApi::connect(&settings.controller),
            settings.controller.url.as_str(),
            settings.interval,
        ) => api,
        () = shutdown_signal() => {
            info!("interrupted before connecting");
            return Ok(());
        }
    };

    let scheduler = GroupScheduler::new(Arc::new(api) as Arc<dyn ChannelApi>, settings.interval);
    scheduler.start(settings.groups).await;

    shutdown_signal().await;
    info!("shutting down");
    scheduler.shutdown().await;
    Ok(())
}

/// Pause after a rejected API key. The key may be fixed on the server
/// while we wait, so this is retried too, just less eagerly.
const AUTH_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Delay before the next connect attempt after `err`.
fn retry_delay(err: &CoreError, interval: Duration) -> Duration {
    match err {
        CoreError::AuthenticationFailed { .. } => interval.max(AUTH_RETRY_DELAY),
        _ => interval,
    }
}

/// Call `connect` until it succeeds, logging each failure.
async fn connect_with_retry<T, F, Fut>(mut connect: F, url: &str, interval: Duration) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    loop {
        match connect().await {
            Ok(api) => return api,
            Err(e) => {
                let delay = retry_delay(&e, interval);
                let retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                if matches!(e, CoreError::AuthenticationFailed { .. }) {
                    error!(url, error = %e, retry_in_ms, "API key rejected");
                } else {
                    warn!(url, error = %e, retry_in_ms, "connect failed");
                }
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
