//! 评审提交与冲突协议
//!
//! 提交前先查一次 (团队, 场次) 的已有记录作为快速路径；真正的裁决是
//! 存储层的唯一索引，插入时的冲突同样映射为 409。两个评审人同时通过
//! 预检查时，只有先落库的一方成功。

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::ReviewService;
use crate::errors::EvalSystemError;
use crate::models::events::entities::ReviewSession;
use crate::models::reviews::requests::SubmitReviewRequest;
use crate::models::reviews::responses::ReviewSubmittedResponse;
use crate::models::teams::responses::TeamWithMembers;
use crate::models::{ApiResponse, ErrorCode};

pub async fn submit_review(
    service: &ReviewService,
    request: &HttpRequest,
    mut review: SubmitReviewRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    review.reviewer_id = review.reviewer_id.trim().to_string();
    if review.reviewer_id.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ReviewDataInvalid,
            "评审人标签不能为空",
        )));
    }

    let session = match storage.get_session_by_id(review.session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SessionNotFound,
                "场次不存在",
            )));
        }
        Err(e) => {
            error!("查询场次失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询场次失败: {e}"),
                )),
            );
        }
    };

    let team = match storage.get_team_with_members(review.team_id).await {
        Ok(Some(team)) => team,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::TeamNotFound, "团队不存在")));
        }
        Err(e) => {
            error!("查询团队失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询团队失败: {e}"),
                )),
            );
        }
    };

    if let Err(message) = sanitize_review(&mut review, &session, &team) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ReviewDataInvalid, message)));
    }

    // 快速路径预检查
    match storage.find_review(review.team_id, review.session_id).await {
        Ok(Some(_)) => {
            return Ok(conflict_response(review.team_id, review.session_id));
        }
        Ok(None) => {}
        Err(e) => {
            error!("查询已有评审失败: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询已有评审失败: {e}"),
                )),
            );
        }
    }

    match storage.insert_review(review).await {
        Ok(stored) => {
            info!(
                "团队 {} 场次 {} 的评审已提交, 评审人: {}",
                stored.team_id, stored.session_id, stored.reviewer_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                ReviewSubmittedResponse { review: stored },
                "评审提交成功",
            )))
        }
        Err(EvalSystemError::ReviewConflict(msg)) => {
            // 预检查之后被别的评审人抢先
            warn!("评审提交冲突: {}", msg);
            Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::ReviewAlreadySubmitted,
                "该场次已有其他评审人提交",
            )))
        }
        Err(e) => {
            error!("插入评审失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ReviewSubmitFailed,
                    format!("插入评审失败: {e}"),
                )),
            )
        }
    }
}

fn conflict_response(team_id: i64, session_id: i64) -> HttpResponse {
    warn!("团队 {} 场次 {} 已有评审提交", team_id, session_id);
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::ReviewAlreadySubmitted,
        "该场次已有其他评审人提交",
    ))
}

/// 收敛提交数据到场次与团队的当前口径
///
/// - 分数夹紧到 [0, max_marks]，缺失的标准补 0，未知标准拒绝
/// - 考勤只保留当前成员，缺失的成员默认到场
pub(crate) fn sanitize_review(
    review: &mut SubmitReviewRequest,
    session: &ReviewSession,
    team: &TeamWithMembers,
) -> Result<(), String> {
    for criterion_id in review.marks.keys() {
        if !session.criteria.iter().any(|c| &c.id == criterion_id) {
            return Err(format!("评分标准 {criterion_id} 不属于该场次"));
        }
    }

    let mut marks: HashMap<String, i32> = HashMap::with_capacity(session.criteria.len());
    for criterion in &session.criteria {
        let entered = review.marks.get(&criterion.id).copied().unwrap_or(0);
        marks.insert(criterion.id.clone(), entered.clamp(0, criterion.max_marks));
    }
    review.marks = marks;

    let mut attendance: HashMap<String, bool> = HashMap::with_capacity(team.members.len());
    for member in &team.members {
        let present = review
            .attendance
            .get(&member.student_id)
            .copied()
            .unwrap_or(true);
        attendance.insert(member.student_id.clone(), present);
    }
    review.attendance = attendance;

    review.remarks = review
        .remarks
        .take()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::entities::Criterion;
    use crate::models::students::entities::Student;

    fn session() -> ReviewSession {
        ReviewSession {
            id: 11,
            event_id: 1,
            session_number: 1,
            criteria: vec![Criterion {
                id: "CRIT1".to_string(),
                label: "Creativity".to_string(),
                max_marks: 10,
            }],
        }
    }

    fn team() -> TeamWithMembers {
        TeamWithMembers {
            id: 5,
            name: "Red".to_string(),
            members: vec![Student {
                id: 1,
                team_id: 5,
                student_id: "S01".to_string(),
                name: "Alice".to_string(),
                details: None,
            }],
        }
    }

    fn request(marks: &[(&str, i32)]) -> SubmitReviewRequest {
        SubmitReviewRequest {
            team_id: 5,
            session_id: 11,
            reviewer_id: "judge-a".to_string(),
            attendance: HashMap::new(),
            marks: marks.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            remarks: None,
        }
    }

    #[test]
    fn marks_above_max_are_clamped() {
        let mut review = request(&[("CRIT1", 12)]);
        sanitize_review(&mut review, &session(), &team()).unwrap();
        assert_eq!(review.marks.get("CRIT1"), Some(&10));
    }

    #[test]
    fn negative_marks_are_clamped_to_zero() {
        let mut review = request(&[("CRIT1", -4)]);
        sanitize_review(&mut review, &session(), &team()).unwrap();
        assert_eq!(review.marks.get("CRIT1"), Some(&0));
    }

    #[test]
    fn missing_marks_default_to_zero() {
        let mut review = request(&[]);
        sanitize_review(&mut review, &session(), &team()).unwrap();
        assert_eq!(review.marks.get("CRIT1"), Some(&0));
    }

    #[test]
    fn unknown_criterion_is_rejected() {
        let mut review = request(&[("NOPE", 5)]);
        assert!(sanitize_review(&mut review, &session(), &team()).is_err());
    }

    #[test]
    fn attendance_defaults_to_present_and_drops_strangers() {
        let mut review = request(&[("CRIT1", 5)]);
        review.attendance.insert("GHOST".to_string(), false);
        sanitize_review(&mut review, &session(), &team()).unwrap();
        assert_eq!(review.attendance.get("S01"), Some(&true));
        assert!(!review.attendance.contains_key("GHOST"));
    }

    #[test]
    fn blank_remarks_become_none() {
        let mut review = request(&[("CRIT1", 5)]);
        review.remarks = Some("   ".to_string());
        sanitize_review(&mut review, &session(), &team()).unwrap();
        assert_eq!(review.remarks, None);
    }
}
