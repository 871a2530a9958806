use async_trait::async_trait;

use super::PgStore;
use crate::audit::{self, AccessLogEntry, AccessLogQuery, NewAccessLogEntry};
use crate::store::{AccessLogStore, StoreResult};

#[async_trait]
impl AccessLogStore for PgStore {
    async fn record_access(&self, entry: NewAccessLogEntry) -> StoreResult<AccessLogEntry> {
        audit::create_access_log_entry(self.pool(), entry).await
    }

    async fn query_access_logs(&self, query: &AccessLogQuery) -> StoreResult<Vec<AccessLogEntry>> {
        audit::query_access_logs(self.pool(), query).await
    }
}
