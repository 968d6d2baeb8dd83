//! Service modules for marquee-scrape

pub mod enrichment_orchestrator;
pub mod fetcher;
pub mod http_transport;
pub mod response_cache;
pub mod scraper;

pub use enrichment_orchestrator::{
    DetailExtractor, Enrichable, EnrichOutcome, EnrichSettings, EnrichmentOrchestrator,
    EnrichmentReport, OutcomeCounts,
};
pub use fetcher::{FetchSettings, Fetcher};
pub use http_transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use response_cache::{CacheEntry, ResponseCache};
pub use scraper::{RunReport, Scraper};
