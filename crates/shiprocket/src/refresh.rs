//! Scheduled renewal of the bearer token.

use std::sync::Arc;

use chrono::Local;
use tokio_util::sync::CancellationToken;

use crate::api::ShiprocketApi;
use crate::config::RefreshSchedule;

pub struct TokenRefresher;

impl TokenRefresher {
    /// Log in again on every tick of `schedule` until `cancel` fires.
    ///
    /// A failed refresh is logged and the previous token stays in use until
    /// the next tick.
    pub async fn run(api: Arc<ShiprocketApi>, schedule: RefreshSchedule, cancel: CancellationToken) {
        tracing::info!(?schedule, "Shiprocket token refresher started");

        loop {
            let delay = schedule.next_delay(Local::now().naive_local());
            tracing::debug!(delay_secs = delay.as_secs(), "Next token refresh scheduled");

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Shiprocket token refresher stopping");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    let result = api.login().await;
                    if result.status {
                        tracing::info!("Shiprocket token refreshed");
                    } else {
                        tracing::error!(
                            error = %result.message,
                            "Shiprocket token refresh failed, keeping previous token"
                        );
                    }
                }
            }
        }
    }
}
