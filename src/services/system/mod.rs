pub mod status;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::config::AppConfig;

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 获取系统状态
    pub async fn get_status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        status::get_status(self, request).await
    }
}
