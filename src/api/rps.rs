//! Request counting and the requests-per-second watcher

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Monotonic count of requests received
#[derive(Debug, Default)]
pub struct RequestCounter {
    total: AtomicU64,
}

impl RequestCounter {
    pub fn increment(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

/// Middleware counting every request that reaches the router
pub async fn count_requests(
    State(counter): State<Arc<RequestCounter>>,
    req: Request,
    next: Next,
) -> Response {
    counter.increment();
    next.run(req).await
}

/// Log the number of requests served in each second that had any
pub fn start_rps_watcher(counter: Arc<RequestCounter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        let mut last = counter.total();

        loop {
            ticker.tick().await;

            let now = counter.total();
            let rps = now.saturating_sub(last);
            last = now;

            if rps > 0 {
                tracing::info!(rps, total = now, "Requests per second");
            }
        }
    })
}
