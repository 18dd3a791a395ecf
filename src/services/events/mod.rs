pub mod create;
pub mod delete;
pub mod list;
pub mod roster;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct EventService {
    storage: Option<Arc<dyn Storage>>,
}

impl EventService {
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

    // 创建活动并导入花名册
    pub async fn create_event(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        create::create_event(self, request, payload).await
    }

    // 获取活动列表
    pub async fn list_events(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_events(self, request).await
    }

    // 获取活动的场次列表
    pub async fn list_sessions(
        &self,
        request: &HttpRequest,
        event_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_sessions(self, request, event_id).await
    }

    // 删除活动
    pub async fn delete_event(
        &self,
        request: &HttpRequest,
        event_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_event(self, request, event_id).await
    }
}
