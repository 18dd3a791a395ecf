//! 活动与场次查询

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::EventService;
use crate::models::events::responses::{EventListResponse, SessionListResponse};
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_events(service: &EventService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_events().await {
        Ok(events) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EventListResponse { events },
            "查询成功",
        ))),
        Err(e) => {
            error!("查询活动列表失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询活动列表失败: {e}"),
                )),
            )
        }
    }
}

pub async fn list_sessions(
    service: &EventService,
    request: &HttpRequest,
    event_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_event_by_id(event_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::EventNotFound, "活动不存在")));
        }
        Err(e) => {
            error!("查询活动失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询活动失败: {e}"),
                )),
            );
        }
    }

    match storage.list_sessions_by_event(event_id).await {
        Ok(sessions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SessionListResponse { sessions },
            "查询成功",
        ))),
        Err(e) => {
            error!("查询场次列表失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询场次列表失败: {e}"),
                )),
            )
        }
    }
}
