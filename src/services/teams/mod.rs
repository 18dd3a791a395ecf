pub mod search;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct TeamService {
    storage: Option<Arc<dyn Storage>>,
}

impl TeamService {
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

    // 按团队名或成员名搜索
    pub async fn search_teams(
        &self,
        request: &HttpRequest,
        query: String,
    ) -> ActixResult<HttpResponse> {
        search::search_teams(self, request, query).await
    }
}
