//! 团队搜索
//!
//! 两路查询（团队名、成员名）在存储层合并去重，这里只做输入检查。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::TeamService;
use crate::models::teams::responses::TeamSearchResponse;
use crate::models::{ApiResponse, ErrorCode};

pub async fn search_teams(
    service: &TeamService,
    request: &HttpRequest,
    query: String,
) -> ActixResult<HttpResponse> {
    let query = query.trim().to_string();
    if query.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "搜索关键字不能为空",
        )));
    }

    let storage = service.get_storage(request);

    match storage.search_teams(&query).await {
        Ok(teams) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            TeamSearchResponse { teams },
            "查询成功",
        ))),
        Err(e) => {
            error!("搜索团队失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("搜索团队失败: {e}"),
                )),
            )
        }
    }
}
