//! 汇总结果查询
//!
//! 每次进入都重新拉取并重算，不做缓存。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ReportService;
use super::assemble;
use crate::errors::Result;
use crate::models::events::entities::{EvaluationEvent, ReviewSession};
use crate::models::reviews::entities::Review;
use crate::models::reviews::responses::CombinedResultsResponse;
use crate::models::teams::responses::TeamWithMembers;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 报表装配所需的全部数据
pub(super) struct ReportData {
    pub event: EvaluationEvent,
    pub sessions: Vec<ReviewSession>,
    pub teams: Vec<TeamWithMembers>,
    pub reviews: Vec<Review>,
}

pub(super) async fn fetch_report_data(
    storage: &Arc<dyn Storage>,
    event_id: i64,
) -> Result<Option<ReportData>> {
    let event = match storage.get_event_by_id(event_id).await? {
        Some(event) => event,
        None => return Ok(None),
    };

    let sessions = storage.list_sessions_by_event(event_id).await?;
    let teams = storage.list_teams_with_members().await?;
    let reviews = storage.list_reviews_for_event(event_id).await?;

    Ok(Some(ReportData {
        event,
        sessions,
        teams,
        reviews,
    }))
}

pub async fn get_results(
    service: &ReportService,
    request: &HttpRequest,
    event_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match fetch_report_data(&storage, event_id).await {
        Ok(Some(data)) => {
            let rows = assemble::assemble_combined_rows(&data.sessions, &data.teams, &data.reviews);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                CombinedResultsResponse { rows },
                "查询成功",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::EventNotFound, "活动不存在"))),
        Err(e) => {
            error!("汇总结果查询失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("汇总结果查询失败: {e}"),
                )),
            )
        }
    }
}
