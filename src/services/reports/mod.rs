pub mod assemble;
pub mod export;
pub mod results;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct ReportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 汇总结果（JSON）
    pub async fn get_results(
        &self,
        request: &HttpRequest,
        event_id: i64,
    ) -> ActixResult<HttpResponse> {
        results::get_results(self, request, event_id).await
    }

    // 汇总结果导出（XLSX）
    pub async fn export_results(
        &self,
        request: &HttpRequest,
        event_id: i64,
    ) -> ActixResult<HttpResponse> {
        export::export_results(self, request, event_id).await
    }

    // 逐学生稠密报表导出（XLSX）
    pub async fn export_consolidated_report(
        &self,
        request: &HttpRequest,
        event_id: i64,
    ) -> ActixResult<HttpResponse> {
        export::export_consolidated_report(self, request, event_id).await
    }
}
