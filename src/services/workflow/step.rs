//! 流程单步推进
//!
//! 状态机本身是纯函数（crate::workflow::apply），这里负责两件事：
//! 把客户端动作补全成携带数据的流程事件（成员列表、场次快照、已完成
//! 场次），以及在提交动作时按存储口径收敛数据、执行冲突协议并把结果
//! 回灌给状态机。状态随请求往返于客户端，回传内容一律视为不可信。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{error, warn};

use super::WorkflowService;
use crate::errors::EvalSystemError;
use crate::models::reviews::requests::SubmitReviewRequest;
use crate::models::workflow::requests::{FlowAction, StepRequest};
use crate::models::workflow::responses::StepResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::reviews::submit::sanitize_review;
use crate::storage::Storage;
use crate::workflow::{self, FlowError, FlowEvent, FlowState, SessionSnapshot, Transition};

pub async fn step(
    service: &WorkflowService,
    request: &HttpRequest,
    step_request: StepRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let StepRequest { state, action } = step_request;

    match action {
        FlowAction::SetIdentity { reviewer_id } => {
            Ok(apply_and_respond(&state, FlowEvent::SetIdentity { reviewer_id }))
        }
        FlowAction::ChangeIdentity => Ok(apply_and_respond(&state, FlowEvent::ChangeIdentity)),
        FlowAction::ToggleAttendance { student_id } => {
            Ok(apply_and_respond(&state, FlowEvent::ToggleAttendance { student_id }))
        }
        FlowAction::ProceedToReview => Ok(apply_and_respond(&state, FlowEvent::ProceedToReview)),
        FlowAction::BackToAttendance => Ok(apply_and_respond(&state, FlowEvent::BackToAttendance)),
        FlowAction::BackToSession => Ok(apply_and_respond(&state, FlowEvent::BackToSession)),
        FlowAction::SetMark {
            criterion_id,
            value,
        } => Ok(apply_and_respond(
            &state,
            FlowEvent::SetMark {
                criterion_id,
                value,
            },
        )),
        FlowAction::SetRemarks { remarks } => {
            Ok(apply_and_respond(&state, FlowEvent::SetRemarks { remarks }))
        }

        FlowAction::SelectEvent { event_id } => {
            select_event(&storage, &state, event_id).await
        }
        FlowAction::SelectTeam { team_id } => select_team(&storage, &state, team_id).await,
        FlowAction::SelectSession { session_id } => {
            select_session(&storage, &state, session_id).await
        }
        FlowAction::Submit => submit(&storage, &state).await,
    }
}

async fn select_event(
    storage: &Arc<dyn Storage>,
    state: &FlowState,
    event_id: i64,
) -> ActixResult<HttpResponse> {
    match storage.get_event_by_id(event_id).await {
        Ok(Some(_)) => Ok(apply_and_respond(state, FlowEvent::SelectEvent { event_id })),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error(
            ErrorCode::EventNotFound,
            StepResponse {
                state: state.clone(),
                notices: Vec::new(),
            },
            "活动不存在",
        ))),
        Err(e) => Ok(internal_error(e)),
    }
}

async fn select_team(
    storage: &Arc<dyn Storage>,
    state: &FlowState,
    team_id: i64,
) -> ActixResult<HttpResponse> {
    // 未选活动或步骤不对时，直接让状态机给出对应的拒绝
    let (reviewer_id, event_id) = match state {
        FlowState::Team {
            reviewer_id,
            event_id: Some(event_id),
        } => (reviewer_id.clone(), *event_id),
        _ => {
            return Ok(apply_and_respond(
                state,
                FlowEvent::SelectTeam {
                    team_id,
                    member_ids: Vec::new(),
                    completed_session_ids: Vec::new(),
                },
            ));
        }
    };

    // 之前选中的活动可能已被删除：回退到最新活动重选
    match storage.get_event_by_id(event_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            let latest = match storage.list_events().await {
                Ok(events) => events.first().map(|e| e.id),
                Err(e) => return Ok(internal_error(e)),
            };
            warn!("活动 {} 已不存在, 回退到最新活动 {:?}", event_id, latest);
            return Ok(HttpResponse::NotFound().json(ApiResponse::error(
                ErrorCode::EventNotFound,
                StepResponse {
                    state: FlowState::Team {
                        reviewer_id,
                        event_id: latest,
                    },
                    notices: Vec::new(),
                },
                "所选活动已不存在，已切换到最新活动",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    }

    let team = match storage.get_team_with_members(team_id).await {
        Ok(Some(team)) => team,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error(
                ErrorCode::TeamNotFound,
                StepResponse {
                    state: state.clone(),
                    notices: Vec::new(),
                },
                "团队不存在",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    let completed_session_ids = match storage.list_completed_session_ids(team_id, event_id).await {
        Ok(ids) => ids,
        Err(e) => return Ok(internal_error(e)),
    };

    let member_ids = team
        .members
        .iter()
        .map(|member| member.student_id.clone())
        .collect();

    Ok(apply_and_respond(
        state,
        FlowEvent::SelectTeam {
            team_id,
            member_ids,
            completed_session_ids,
        },
    ))
}

async fn select_session(
    storage: &Arc<dyn Storage>,
    state: &FlowState,
    session_id: i64,
) -> ActixResult<HttpResponse> {
    let event_id = match state {
        FlowState::Session { event_id, .. } => *event_id,
        _ => return Ok(reject(state, FlowError::InvalidTransition)),
    };

    let session = match storage.get_session_by_id(session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error(
                ErrorCode::SessionNotFound,
                StepResponse {
                    state: state.clone(),
                    notices: Vec::new(),
                },
                "场次不存在",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    if session.event_id != event_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::SessionNotFound,
            StepResponse {
                state: state.clone(),
                notices: Vec::new(),
            },
            "场次不属于当前活动",
        )));
    }

    let snapshot = SessionSnapshot {
        id: session.id,
        session_number: session.session_number,
        criteria: session.criteria,
    };

    Ok(apply_and_respond(state, FlowEvent::SelectSession { session: snapshot }))
}

async fn submit(storage: &Arc<dyn Storage>, state: &FlowState) -> ActixResult<HttpResponse> {
    let (reviewer_id, event_id, team_id, session, attendance, marks, remarks) = match state {
        FlowState::Review {
            reviewer_id,
            event_id,
            team_id,
            session,
            attendance,
            marks,
            remarks,
            ..
        } => (
            reviewer_id.clone(),
            *event_id,
            *team_id,
            session.clone(),
            attendance.clone(),
            marks.clone(),
            remarks.clone(),
        ),
        _ => return Ok(reject(state, FlowError::InvalidTransition)),
    };

    // 状态随请求往返于客户端，场次与团队口径一律以存储为准
    let stored_session = match storage.get_session_by_id(session.id).await {
        Ok(Some(stored_session)) => stored_session,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error(
                ErrorCode::SessionNotFound,
                StepResponse {
                    state: state.clone(),
                    notices: Vec::new(),
                },
                "场次不存在",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    if stored_session.event_id != event_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::SessionNotFound,
            StepResponse {
                state: state.clone(),
                notices: Vec::new(),
            },
            "场次不属于当前活动",
        )));
    }

    let team = match storage.get_team_with_members(team_id).await {
        Ok(Some(team)) => team,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error(
                ErrorCode::TeamNotFound,
                StepResponse {
                    state: state.clone(),
                    notices: Vec::new(),
                },
                "团队不存在",
            )));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    let mut review = SubmitReviewRequest {
        team_id,
        session_id: stored_session.id,
        reviewer_id,
        attendance,
        marks,
        remarks,
    };

    if let Err(message) = sanitize_review(&mut review, &stored_session, &team) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::ReviewDataInvalid,
            StepResponse {
                state: state.clone(),
                notices: Vec::new(),
            },
            message,
        )));
    }

    // 快速路径预检查
    match storage.find_review(team_id, session.id).await {
        Ok(Some(_)) => return conflict(storage, state, team_id, event_id, session.id).await,
        Ok(None) => {}
        Err(e) => return Ok(internal_error(e)),
    }

    match storage.insert_review(review).await {
        Ok(_) => {
            let transition = match workflow::apply(state, FlowEvent::SubmitSucceeded) {
                Ok(transition) => transition,
                Err(e) => return Ok(reject(state, e)),
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                StepResponse {
                    state: transition.state,
                    notices: transition.notices,
                },
                "评审提交成功",
            )))
        }
        // 预检查之后被别的评审人抢先
        Err(EvalSystemError::ReviewConflict(_)) => {
            conflict(storage, state, team_id, event_id, session.id).await
        }
        Err(e) => Ok(internal_error(e)),
    }
}

/// 冲突路径：刷新完成列表，丢弃草稿回到场次选择
async fn conflict(
    storage: &Arc<dyn Storage>,
    state: &FlowState,
    team_id: i64,
    event_id: i64,
    session_id: i64,
) -> ActixResult<HttpResponse> {
    warn!("团队 {} 场次 {} 提交冲突", team_id, session_id);

    let completed_session_ids = match storage.list_completed_session_ids(team_id, event_id).await {
        Ok(ids) => ids,
        Err(e) => return Ok(internal_error(e)),
    };

    let transition = match workflow::apply(
        state,
        FlowEvent::SubmitConflicted {
            completed_session_ids,
        },
    ) {
        Ok(transition) => transition,
        Err(e) => return Ok(reject(state, e)),
    };

    Ok(HttpResponse::Conflict().json(ApiResponse::error(
        ErrorCode::ReviewAlreadySubmitted,
        StepResponse {
            state: transition.state,
            notices: transition.notices,
        },
        "该场次已有其他评审人提交，已返回场次选择",
    )))
}

fn apply_and_respond(state: &FlowState, event: FlowEvent) -> HttpResponse {
    match workflow::apply(state, event) {
        Ok(Transition { state, notices }) => HttpResponse::Ok().json(ApiResponse::success(
            StepResponse { state, notices },
            "操作成功",
        )),
        Err(e) => reject(state, e),
    }
}

/// 拒绝的转移：状态原样返回
fn reject(state: &FlowState, error: FlowError) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error(
        ErrorCode::BadRequest,
        StepResponse {
            state: state.clone(),
            notices: Vec::new(),
        },
        error.to_string(),
    ))
}

fn internal_error(e: EvalSystemError) -> HttpResponse {
    error!("流程推进失败: {}", e);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("流程推进失败: {e}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::models::events::entities::{Criterion, EvaluationEvent, ReviewSession};
    use crate::models::reviews::entities::Review;
    use crate::models::students::entities::Student;
    use crate::models::students::requests::NewStudent;
    use crate::models::teams::entities::Team;
    use crate::models::teams::responses::TeamWithMembers;
    use actix_web::http::StatusCode;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 固定一个场次和一个团队，记录落库的提交
    struct FixedStorage {
        session: ReviewSession,
        team: TeamWithMembers,
        inserted: Mutex<Option<SubmitReviewRequest>>,
    }

    #[async_trait]
    impl Storage for FixedStorage {
        async fn create_event(&self, _name: &str, _num_sessions: i32) -> Result<EvaluationEvent> {
            unimplemented!()
        }

        async fn create_sessions(
            &self,
            _event_id: i64,
            _criteria_per_session: &[Vec<Criterion>],
        ) -> Result<Vec<ReviewSession>> {
            unimplemented!()
        }

        async fn list_events(&self) -> Result<Vec<EvaluationEvent>> {
            Ok(Vec::new())
        }

        async fn get_event_by_id(&self, _event_id: i64) -> Result<Option<EvaluationEvent>> {
            unimplemented!()
        }

        async fn delete_event(&self, _event_id: i64) -> Result<bool> {
            unimplemented!()
        }

        async fn list_sessions_by_event(&self, _event_id: i64) -> Result<Vec<ReviewSession>> {
            unimplemented!()
        }

        async fn get_session_by_id(&self, session_id: i64) -> Result<Option<ReviewSession>> {
            Ok((session_id == self.session.id).then(|| self.session.clone()))
        }

        async fn upsert_teams_by_name(&self, _names: &[String]) -> Result<Vec<Team>> {
            unimplemented!()
        }

        async fn search_teams(&self, _query: &str) -> Result<Vec<TeamWithMembers>> {
            unimplemented!()
        }

        async fn get_team_with_members(&self, team_id: i64) -> Result<Option<TeamWithMembers>> {
            Ok((team_id == self.team.id).then(|| self.team.clone()))
        }

        async fn list_teams_with_members(&self) -> Result<Vec<TeamWithMembers>> {
            unimplemented!()
        }

        async fn upsert_students(&self, _batch: &[NewStudent]) -> Result<usize> {
            unimplemented!()
        }

        async fn list_students_by_team(&self, _team_id: i64) -> Result<Vec<Student>> {
            unimplemented!()
        }

        async fn find_review(&self, _team_id: i64, _session_id: i64) -> Result<Option<Review>> {
            Ok(None)
        }

        async fn insert_review(&self, request: SubmitReviewRequest) -> Result<Review> {
            let review = Review {
                id: 1,
                team_id: request.team_id,
                session_id: request.session_id,
                attendance: request.attendance.clone(),
                marks: request.marks.clone(),
                remarks: request.remarks.clone(),
                reviewer_id: request.reviewer_id.clone(),
                created_at: chrono::Utc::now(),
            };
            *self.inserted.lock().unwrap() = Some(request);
            Ok(review)
        }

        async fn list_completed_session_ids(
            &self,
            _team_id: i64,
            _event_id: i64,
        ) -> Result<Vec<i64>> {
            Ok(vec![self.session.id])
        }

        async fn list_reviews_for_event(&self, _event_id: i64) -> Result<Vec<Review>> {
            unimplemented!()
        }
    }

    fn fixed_storage() -> (Arc<FixedStorage>, Arc<dyn Storage>) {
        let stub = Arc::new(FixedStorage {
            session: ReviewSession {
                id: 11,
                event_id: 1,
                session_number: 1,
                criteria: vec![Criterion {
                    id: "CRIT1".to_string(),
                    label: "Creativity".to_string(),
                    max_marks: 10,
                }],
            },
            team: TeamWithMembers {
                id: 5,
                name: "Red".to_string(),
                members: vec![Student {
                    id: 1,
                    team_id: 5,
                    student_id: "S01".to_string(),
                    name: "Alice".to_string(),
                    details: None,
                }],
            },
            inserted: Mutex::new(None),
        });
        let storage: Arc<dyn Storage> = stub.clone();
        (stub, storage)
    }

    fn review_state(marks: HashMap<String, i32>, criteria: Vec<Criterion>) -> FlowState {
        FlowState::Review {
            reviewer_id: "judge-a".to_string(),
            event_id: 1,
            team_id: 5,
            session: SessionSnapshot {
                id: 11,
                session_number: 1,
                criteria,
            },
            attendance: HashMap::from([("S01".to_string(), true)]),
            marks,
            remarks: None,
            completed_session_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn tampered_snapshot_cannot_raise_mark_ceiling() {
        let (stub, storage) = fixed_storage();

        // 回传快照声称满分 999，存储中的场次满分是 10
        let mut state = review_state(
            HashMap::from([("CRIT1".to_string(), 999)]),
            vec![Criterion {
                id: "CRIT1".to_string(),
                label: "Creativity".to_string(),
                max_marks: 999,
            }],
        );
        if let FlowState::Review { attendance, .. } = &mut state {
            attendance.insert("GHOST".to_string(), false);
        }

        let response = submit(&storage, &state).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let inserted = stub.inserted.lock().unwrap();
        let review = inserted.as_ref().expect("review inserted");
        assert_eq!(review.marks.get("CRIT1"), Some(&10));
        assert!(!review.attendance.contains_key("GHOST"));
    }

    #[tokio::test]
    async fn criterion_outside_stored_session_is_rejected() {
        let (stub, storage) = fixed_storage();

        let state = review_state(
            HashMap::from([("BOGUS".to_string(), 5)]),
            vec![Criterion {
                id: "BOGUS".to_string(),
                label: "Invented".to_string(),
                max_marks: 100,
            }],
        );

        let response = submit(&storage, &state).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(stub.inserted.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn vanished_session_in_state_yields_not_found() {
        let (stub, storage) = fixed_storage();

        let mut state = review_state(
            HashMap::from([("CRIT1".to_string(), 5)]),
            vec![Criterion {
                id: "CRIT1".to_string(),
                label: "Creativity".to_string(),
                max_marks: 10,
            }],
        );
        if let FlowState::Review { session, .. } = &mut state {
            session.id = 404;
        }

        let response = submit(&storage, &state).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(stub.inserted.lock().unwrap().is_none());
    }
}
