pub mod rainbet; // Date-range affiliate totals (cycle leaderboards)
pub mod xfun; // Skip/take paginated per-bet records (biweekly board)

use async_trait::async_trait;
use tracing::debug;

use crate::error::UpstreamError;
use crate::models::{RawEntry, RawRecord, TimeWindow};

pub use rainbet::RainbetClient;
pub use xfun::{Metric, XfunClient};

/// Upstream that returns per-affiliate totals for a whole window in one call.
#[async_trait]
pub trait AffiliateSource: Send + Sync {
    async fn fetch_window(&self, window: &TimeWindow) -> Result<Vec<RawEntry>, UpstreamError>;
}

/// Upstream that pages raw records with `take`/`skip`.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        window: &TimeWindow,
        take: u32,
        skip: u32,
    ) -> Result<Vec<RawRecord>, UpstreamError>;
}

/// Walk every page of `window`, in order, and concatenate the records.
///
/// Stops on the first short page or after `max_pages` requests. A failed page aborts the
/// whole walk; nothing fetched so far is returned.
pub async fn fetch_all<S>(
    source: &S,
    window: &TimeWindow,
    page_size: u32,
    max_pages: u32,
) -> Result<Vec<RawRecord>, UpstreamError>
where
    S: PageSource + ?Sized,
{
    let take = page_size.max(1);
    let mut all: Vec<RawRecord> = Vec::new();

    for page in 0..max_pages {
        let skip = page.saturating_mul(take);
        let chunk = source
            .fetch_page(window, take, skip)
            .await
            .map_err(|e| UpstreamError::PaginationAbort {
                page,
                source: Box::new(e),
            })?;

        let count = chunk.len();
        all.extend(chunk);
        if count < take as usize {
            break;
        }
    }

    debug!(records = all.len(), "Paginated fetch complete");
    Ok(all)
}
