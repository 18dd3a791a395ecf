use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::models::system::responses::SystemStatusResponse;
use crate::models::{ApiResponse, AppStartTime};

/// 获取系统状态（只读，公开）
pub async fn get_status(service: &SystemService, req: &HttpRequest) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let (started_at, uptime_seconds) = match req.app_data::<web::Data<AppStartTime>>() {
        Some(start) => {
            let started_at = start.start_datetime;
            let uptime = chrono::Utc::now()
                .signed_duration_since(started_at)
                .num_seconds();
            (started_at, uptime)
        }
        None => (chrono::Utc::now(), 0),
    };

    let response = SystemStatusResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.app.environment.clone(),
        uptime_seconds,
        started_at,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "系统状态获取成功")))
}
