/*
[INPUT]:  Log page requests from the task log store
[OUTPUT]: Log pages from any backend implementation
[POS]:    Fetch seam - decouples pagination state from the HTTP transport
[UPDATE]: When the page request contract changes
*/

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{Result, TasklogClient};
use crate::types::{LogPage, LogPageRequest};

/// Source of task log pages
///
/// Implementations must return `logs` oldest-first and cursors that are valid
/// inputs for the next request in each direction.
#[async_trait]
pub trait LogFetcher: Send + Sync {
    async fn fetch_page(&self, req: &LogPageRequest) -> Result<LogPage>;
}

#[async_trait]
impl LogFetcher for TasklogClient {
    async fn fetch_page(&self, req: &LogPageRequest) -> Result<LogPage> {
        self.fetch_task_logs(req).await
    }
}

#[async_trait]
impl<T> LogFetcher for Arc<T>
where
    T: LogFetcher + ?Sized,
{
    async fn fetch_page(&self, req: &LogPageRequest) -> Result<LogPage> {
        (**self).fetch_page(req).await
    }
}
