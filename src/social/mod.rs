//! Social Module - Feed Mirrors, Admission Control & Parsing
//!
//! Best-effort layer: an unreachable feed is an empty collection, never an error.

pub mod admission;
pub mod fallback;
pub mod feed;
pub mod scrape;

pub use admission::{ScrapeAdmissionController, ScrapePermit};
pub use fallback::{try_in_order, MirrorFallbackFetcher, PageSource};
pub use feed::FeedQuery;
pub use scrape::ScrapeClient;
