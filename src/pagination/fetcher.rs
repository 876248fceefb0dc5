//! Paginated download of a whole collection
//!
//! Page 1 is fetched alone; its `Link` header announces the last page, and
//! pages `next..=last` are then requested concurrently. Every page is
//! projected and accumulated as it completes, with a progress report after
//! each.

use super::types::{FetchOptions, LinkTable, PageMetadata};
use crate::error::{Error, Result};
use crate::http::{ApiClient, EndpointRequest};
use crate::progress::{self, Download, ProgressReport, Reporter};
use crate::projection::{project, FieldProjection};
use crate::types::{JsonValue, PageOrder, Records};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Downloads every page of a list endpoint
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Arc<ApiClient>,
    options: FetchOptions,
}

impl PageFetcher {
    /// Create a fetcher using the client's page size
    pub fn new(client: Arc<ApiClient>) -> Self {
        let options = FetchOptions::default().per_page(client.config().per_page);
        Self { client, options }
    }

    /// Replace the download options
    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Download options
    pub fn options(&self) -> FetchOptions {
        self.options
    }

    /// The underlying client
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Start downloading every page of `handler`.
    ///
    /// The download runs in its own task; the returned [`Download`] yields a
    /// report per page and then the whole collection.
    pub fn fetch_all(
        &self,
        handler: impl Into<String>,
        projection: Option<FieldProjection>,
    ) -> Download<Records> {
        let (reporter, download) = progress::channel();
        let fetcher = self.clone();
        let handler = handler.into();

        tokio::spawn(async move {
            let result = fetcher
                .collect_pages(&handler, projection.as_ref(), &reporter)
                .await;
            reporter.finish(result);
        });

        download
    }

    async fn collect_pages(
        &self,
        handler: &str,
        projection: Option<&FieldProjection>,
        reporter: &Reporter<Records>,
    ) -> Result<Records> {
        let per_page = self.options.per_page;

        let first = self
            .client
            .request(&EndpointRequest::new(handler).page(1, per_page))
            .await?;
        let links = first.link_header().map(LinkTable::parse);
        let meta = PageMetadata::from_links(links.as_ref());
        let records = page_records(first.into_body(), projection)?;

        debug!(
            "Page 1 of {} loaded: {} records, next={:?}, last={:?}",
            handler,
            records.len(),
            meta.next,
            meta.last
        );

        let mut pages = PageAccumulator::new(self.options.order);
        let report = ProgressReport {
            next_page: meta.next,
            total_pages: meta.last,
            per_page: per_page as usize,
            data: records.clone(),
        };
        pages.push(1, records);

        if reporter.report(report).await.should_stop() {
            info!("Download of {} stopped after page 1", handler);
            return Err(Error::TooManyPages {
                total_pages: meta.last,
            });
        }

        let (Some(remaining), Some(total)) = (meta.remaining_pages(), meta.last) else {
            info!("Downloaded {}: {} records in 1 page", handler, pages.len());
            return Ok(pages.into_records());
        };

        let client = &self.client;
        let mut in_flight: FuturesUnordered<_> = remaining
            .map(|page| {
                let request = EndpointRequest::new(handler).page(page, per_page);
                async move { (page, client.request(&request).await) }
            })
            .collect();
        let mut outstanding = in_flight.len() as u32;

        debug!("Fetching {} more pages of {}", outstanding, handler);

        while let Some((page, result)) = in_flight.next().await {
            let records = page_records(result?.into_body(), projection)?;
            outstanding -= 1;

            debug!(
                "Page {} of {} loaded: {} records, {} outstanding",
                page,
                handler,
                records.len(),
                outstanding
            );

            reporter.notify(ProgressReport {
                next_page: Some(total.saturating_sub(outstanding)),
                total_pages: Some(total),
                per_page: per_page as usize,
                data: records.clone(),
            });
            pages.push(page, records);
        }

        info!(
            "Downloaded {}: {} records in {} pages",
            handler,
            pages.len(),
            total
        );
        Ok(pages.into_records())
    }
}

/// Project the records of one page body
///
/// A body that is not a JSON array is a [`Error::MalformedPage`].
pub fn page_records(body: JsonValue, projection: Option<&FieldProjection>) -> Result<Records> {
    match body {
        JsonValue::Array(items) => Ok(items
            .into_iter()
            .map(|record| project(record, projection))
            .collect()),
        payload => Err(Error::MalformedPage { payload }),
    }
}

/// Records of completed pages, tagged by page number
#[derive(Debug)]
struct PageAccumulator {
    order: PageOrder,
    pages: Vec<(u32, Records)>,
    count: usize,
}

impl PageAccumulator {
    fn new(order: PageOrder) -> Self {
        Self {
            order,
            pages: Vec::new(),
            count: 0,
        }
    }

    fn push(&mut self, page: u32, records: Records) {
        self.count += records.len();
        self.pages.push((page, records));
    }

    fn len(&self) -> usize {
        self.count
    }

    fn into_records(mut self) -> Records {
        if self.order == PageOrder::PageNumber {
            self.pages.sort_by_key(|(page, _)| *page);
        }

        let mut records = Vec::with_capacity(self.count);
        for (_, page) in self.pages {
            records.extend(page);
        }
        records
    }
}
