//! 删除活动，场次与评审随外键级联删除

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::EventService;
use crate::models::{ApiResponse, ErrorCode};

pub async fn delete_event(
    service: &EventService,
    request: &HttpRequest,
    event_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_event(event_id).await {
        Ok(true) => {
            info!("活动 {} 已删除", event_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("活动已删除")))
        }
        Ok(false) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::EventNotFound, "活动不存在"))),
        Err(e) => {
            error!("删除活动失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::EventDeleteFailed,
                    format!("删除活动失败: {e}"),
                )),
            )
        }
    }
}
