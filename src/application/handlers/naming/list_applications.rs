//! ListApplicationsHandler - Query handler for reviewing pending applications.

use std::sync::Arc;

use crate::application::ApplicationQueue;
use crate::config::PricingConfig;
use crate::domain::naming::{ApplicationRecord, RegistryError};

/// Query for one page of pending applications.
#[derive(Debug, Clone, Copy)]
pub struct ListApplicationsQuery {
    /// 1-based page number; 0 is treated as 1.
    pub page: u32,
    pub page_size: u32,
}

impl ListApplicationsQuery {
    /// Requests `page` with the configured page size.
    pub fn page(page: u32, pricing: &PricingConfig) -> Self {
        Self {
            page,
            page_size: pricing.page_size,
        }
    }
}

/// One page of pending applications plus the total pending count.
#[derive(Debug, Clone)]
pub struct ListApplicationsResult {
    pub applications: Vec<ApplicationRecord>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl ListApplicationsResult {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        let size = u64::from(self.page_size);
        (self.total + size - 1) / size
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

/// Handler for listing applications.
pub struct ListApplicationsHandler {
    queue: Arc<ApplicationQueue>,
}

impl ListApplicationsHandler {
    pub fn new(queue: Arc<ApplicationQueue>) -> Self {
        Self { queue }
    }

    pub async fn handle(
        &self,
        query: ListApplicationsQuery,
    ) -> Result<ListApplicationsResult, RegistryError> {
        let page = query.page.max(1);
        let offset = u64::from(page - 1) * u64::from(query.page_size);

        let applications = self.queue.query_with_page(query.page_size, offset).await?;
        let total = self.queue.query_count().await?;

        Ok(ListApplicationsResult {
            applications,
            page,
            page_size: query.page_size,
            total,
        })
    }
}
