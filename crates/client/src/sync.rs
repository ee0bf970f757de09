use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};
use tracing::trace;

use crate::api::PixelApi;
use crate::error::ClientError;
use crate::snapshot::{Grid, WallSnapshot};

/// A source of wall states. Rendering only ever sees what this hands out, so a pull
/// implementation can be swapped for a push one without touching the renderer.
pub trait WallSynchronizer: Send {
    /// Waits for and returns the next known state of the wall.
    fn next_snapshot(&mut self) -> impl Future<Output = Result<WallSnapshot, ClientError>> + Send;
}

/// Shortest polling period; shorter ones are raised to it.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Fetches the whole wall on a fixed period. The first snapshot is fetched immediately.
pub struct PollingSynchronizer<A> {
    api: A,
    grid: Grid,
    period: Duration,
    ticker: Option<Interval>,
}

impl<A: PixelApi> PollingSynchronizer<A> {
    pub fn new(api: A, grid: Grid, period: Duration) -> Self {
        Self {
            api,
            grid,
            period: period.max(MIN_PERIOD),
            ticker: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl<A: PixelApi> WallSynchronizer for PollingSynchronizer<A> {
    async fn next_snapshot(&mut self) -> Result<WallSnapshot, ClientError> {
        let period = self.period;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;

        let pixels = self.api.list().await?;
        trace!("Polled {} pixels", pixels.len());
        Ok(WallSnapshot::from_pixels(self.grid, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WallClient;

    #[test]
    fn test_zero_period_is_raised() {
        let client = WallClient::new("http://127.0.0.1:1/api/pixels");
        let sync = PollingSynchronizer::new(client.clone(), Grid::default(), Duration::ZERO);
        assert_eq!(sync.period(), MIN_PERIOD);

        let sync = PollingSynchronizer::new(client, Grid::default(), Duration::from_secs(2));
        assert_eq!(sync.period(), Duration::from_secs(2));
    }
}
