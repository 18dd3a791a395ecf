pub mod step;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::workflow::requests::StepRequest;
use crate::storage::Storage;

pub struct WorkflowService {
    storage: Option<Arc<dyn Storage>>,
}

impl WorkflowService {
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

    // 推进评审流程一步
    pub async fn step(
        &self,
        request: &HttpRequest,
        step_request: StepRequest,
    ) -> ActixResult<HttpResponse> {
        step::step(self, request, step_request).await
    }
}
