// src/store/memory.rs
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::store::{NewReport, Report, ReportStore, ReportSummary, StoreError};

/// In-process store, insertion ordered. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryReportStore {
    reports: RwLock<Vec<Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.read().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create(&self, report: NewReport) -> Result<Report, StoreError> {
        let stored = Report {
            id: Uuid::new_v4(),
            keyword: report.keyword,
            analysis_result: report.analysis_result,
            trend_data: report.trend_data,
            news_data: report.news_data,
            created_at: Some(report.created_at),
        };
        let mut guard = self.reports.write().unwrap_or_else(|e| e.into_inner());
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: Uuid) -> Result<Report, StoreError> {
        let guard = self.reports.read().unwrap_or_else(|e| e.into_inner());
        guard.iter().find(|r| r.id == id).cloned().ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut guard = self.reports.write().unwrap_or_else(|e| e.into_inner());
        guard.retain(|r| r.id != id);
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<ReportSummary>, StoreError> {
        let guard = self.reports.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.iter().rev().take(limit).map(ReportSummary::from).collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::CollectedData;
    use crate::keyword::Keyword;
    use crate::synthesis::MockSynthesizer;

    fn new_report(kw: &str) -> NewReport {
        let keyword = Keyword::parse(kw).unwrap();
        NewReport {
            keyword: keyword.as_str().to_string(),
            analysis_result: MockSynthesizer::analysis_for(&keyword, &CollectedData::default()),
            trend_data: Default::default(),
            news_data: vec![],
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_get_list_delete() {
        let store = MemoryReportStore::new();
        let a = store.create(new_report("첫번째")).await.unwrap();
        let b = store.create(new_report("두번째")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.created_at.is_some());

        assert_eq!(store.get(a.id).await.unwrap(), a);

        let list = store.list(100).await.unwrap();
        assert_eq!(list.iter().map(|s| s.id).collect::<Vec<_>>(), vec![b.id, a.id]);
        assert_eq!(store.list(1).await.unwrap().len(), 1);

        store.delete(a.id).await.unwrap();
        assert_eq!(store.get(a.id).await, Err(StoreError::NotFound));
        assert_eq!(store.len(), 1);

        // Deleting twice is not an error.
        store.delete(a.id).await.unwrap();
    }
}
