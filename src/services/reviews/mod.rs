pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::reviews::requests::SubmitReviewRequest;
use crate::storage::Storage;

pub struct ReviewService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReviewService {
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

    // 提交评审
    pub async fn submit_review(
        &self,
        request: &HttpRequest,
        review: SubmitReviewRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_review(self, request, review).await
    }
}
