//! Scrape admission control
//!
//! Bounds the number of in-flight calls to the metered scraping backend.
//! Built on `tokio::sync::Semaphore`, which hands permits out in FIFO order,
//! so waiters are served longest-waiting first. A permit is released when the
//! guard drops, which covers early returns, `?` and timeout cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use eyre::{eyre, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::utils::constants::MAX_CONCURRENT_SCRAPES;

/// Constructed per process (or per test); never a global
#[derive(Clone)]
pub struct ScrapeAdmissionController {
    semaphore: Arc<Semaphore>,
    limit: usize,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Default for ScrapeAdmissionController {
    fn default() -> Self {
        Self::new(MAX_CONCURRENT_SCRAPES)
    }
}

impl ScrapeAdmissionController {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Suspend until a slot frees, then hold it for the guard's lifetime
    pub async fn acquire(&self) -> Result<ScrapePermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| eyre!("Scrape gate closed: {}", e))?;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        debug!("🎫 Scrape slot acquired ({}/{})", now, self.limit);

        Ok(ScrapePermit {
            _permit: permit,
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Calls currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest concurrent occupancy observed since construction
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Scoped slot; dropping it releases the slot to the next waiter
pub struct ScrapePermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for ScrapePermit {
    fn drop(&mut self) {
        // Counter first: the semaphore permit is released after this body runs
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
