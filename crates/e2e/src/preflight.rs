//! Target reachability check

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Poll `url` until it answers with a success status or `limit` runs out
pub async fn check_reachable(url: &str, limit: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(limit.min(Duration::from_secs(5)))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;
    let mut last_problem = String::from("no attempt made");

    while attempts == 0 || start.elapsed() < limit {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Target reachable at {}", url);
                return Ok(());
            }
            Ok(resp) => {
                warn!("Preflight returned {}", resp.status());
                last_problem = format!("HTTP {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {}...", url);
                }
                last_problem = e.to_string();
            }
        }

        sleep(Duration::from_millis(250)).await;
    }

    Err(E2eError::SurfaceUnavailable(format!(
        "{} not reachable after {} attempt(s): {}",
        url, attempts, last_problem
    )))
}
