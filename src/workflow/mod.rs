//! 评审流程状态机
//!
//! 转移是纯函数：`apply(state, event)` 返回新状态或拒绝原因，不触碰
//! 存储，不依赖执行环境，可以脱离 HTTP 层单独测试。数据补全（成员
//! 列表、已完成场次、提交结果）由服务层在构造事件时完成。

pub mod state;

use std::collections::HashMap;

pub use state::{FlowError, FlowEvent, FlowNotice, FlowState, SessionSnapshot, Transition};

/// 应用一个事件，返回转移结果
///
/// 拒绝的事件不改变状态：调用方应把错误展示给用户并保留原状态。
pub fn apply(state: &FlowState, event: FlowEvent) -> Result<Transition, FlowError> {
    // 任意状态都可以重设身份
    match event {
        FlowEvent::SetIdentity { reviewer_id } => {
            let reviewer_id = reviewer_id.trim().to_string();
            if reviewer_id.is_empty() {
                return Err(FlowError::BlankIdentity);
            }
            return Ok(Transition::to(FlowState::Team {
                reviewer_id,
                event_id: None,
            }));
        }
        FlowEvent::ChangeIdentity => {
            return Ok(Transition::to(FlowState::Identity));
        }
        _ => {}
    }

    match (state, event) {
        (FlowState::Team { reviewer_id, .. }, FlowEvent::SelectEvent { event_id }) => {
            Ok(Transition::to(FlowState::Team {
                reviewer_id: reviewer_id.clone(),
                event_id: Some(event_id),
            }))
        }

        (
            FlowState::Team {
                reviewer_id,
                event_id,
            },
            FlowEvent::SelectTeam {
                team_id,
                member_ids,
                completed_session_ids,
            },
        ) => {
            // 选团队前必须先选活动
            let event_id = event_id.ok_or(FlowError::NoEventSelected)?;
            let attendance: HashMap<String, bool> =
                member_ids.into_iter().map(|id| (id, true)).collect();
            Ok(Transition::to(FlowState::Session {
                reviewer_id: reviewer_id.clone(),
                event_id,
                team_id,
                attendance,
                completed_session_ids,
            }))
        }

        (
            FlowState::Session {
                reviewer_id,
                event_id,
                team_id,
                attendance,
                completed_session_ids,
            },
            FlowEvent::SelectSession { session },
        ) => {
            // 已完成的场次不可再次评审
            if completed_session_ids.contains(&session.id) {
                return Err(FlowError::SessionAlreadyCompleted {
                    session_id: session.id,
                });
            }
            let marks: HashMap<String, i32> = session
                .criteria
                .iter()
                .map(|c| (c.id.clone(), 0))
                .collect();
            Ok(Transition::to(FlowState::Attendance {
                reviewer_id: reviewer_id.clone(),
                event_id: *event_id,
                team_id: *team_id,
                session,
                attendance: attendance.clone(),
                marks,
                completed_session_ids: completed_session_ids.clone(),
            }))
        }

        (
            FlowState::Attendance {
                reviewer_id,
                event_id,
                team_id,
                session,
                attendance,
                marks,
                completed_session_ids,
            },
            FlowEvent::ToggleAttendance { student_id },
        ) => {
            let mut attendance = attendance.clone();
            match attendance.get_mut(&student_id) {
                Some(present) => *present = !*present,
                None => return Err(FlowError::UnknownStudent { student_id }),
            }
            Ok(Transition::to(FlowState::Attendance {
                reviewer_id: reviewer_id.clone(),
                event_id: *event_id,
                team_id: *team_id,
                session: session.clone(),
                attendance,
                marks: marks.clone(),
                completed_session_ids: completed_session_ids.clone(),
            }))
        }

        (
            FlowState::Attendance {
                reviewer_id,
                event_id,
                team_id,
                session,
                attendance,
                marks,
                completed_session_ids,
            },
            FlowEvent::ProceedToReview,
        ) => Ok(Transition::to(FlowState::Review {
            reviewer_id: reviewer_id.clone(),
            event_id: *event_id,
            team_id: *team_id,
            session: session.clone(),
            attendance: attendance.clone(),
            marks: marks.clone(),
            remarks: None,
            completed_session_ids: completed_session_ids.clone(),
        })),

        (
            FlowState::Attendance {
                reviewer_id,
                event_id,
                team_id,
                attendance,
                completed_session_ids,
                ..
            },
            FlowEvent::BackToSession,
        ) => {
            // 放弃本场次草稿，考勤恢复为全员到场
            let attendance = attendance.keys().map(|id| (id.clone(), true)).collect();
            Ok(Transition::to(FlowState::Session {
                reviewer_id: reviewer_id.clone(),
                event_id: *event_id,
                team_id: *team_id,
                attendance,
                completed_session_ids: completed_session_ids.clone(),
            }))
        }

        (
            FlowState::Review {
                reviewer_id,
                event_id,
                team_id,
                session,
                attendance,
                marks,
                completed_session_ids,
                ..
            },
            FlowEvent::BackToAttendance,
        ) => Ok(Transition::to(FlowState::Attendance {
            reviewer_id: reviewer_id.clone(),
            event_id: *event_id,
            team_id: *team_id,
            session: session.clone(),
            attendance: attendance.clone(),
            marks: marks.clone(),
            completed_session_ids: completed_session_ids.clone(),
        })),

        (
            FlowState::Review {
                reviewer_id,
                event_id,
                team_id,
                session,
                attendance,
                marks,
                remarks,
                completed_session_ids,
            },
            FlowEvent::SetMark {
                criterion_id,
                value,
            },
        ) => {
            let criterion = session
                .criteria
                .iter()
                .find(|c| c.id == criterion_id)
                .ok_or_else(|| FlowError::UnknownCriterion {
                    criterion_id: criterion_id.clone(),
                })?;

            // 夹紧到 [0, max_marks]，越界时附带提示
            let stored = value.clamp(0, criterion.max_marks);
            let mut marks = marks.clone();
            marks.insert(criterion_id.clone(), stored);

            let next = FlowState::Review {
                reviewer_id: reviewer_id.clone(),
                event_id: *event_id,
                team_id: *team_id,
                session: session.clone(),
                attendance: attendance.clone(),
                marks,
                remarks: remarks.clone(),
                completed_session_ids: completed_session_ids.clone(),
            };

            if stored != value {
                Ok(Transition::with_notice(
                    next,
                    FlowNotice::MarkClamped {
                        criterion_id,
                        entered: value,
                        stored,
                    },
                ))
            } else {
                Ok(Transition::to(next))
            }
        }

        (
            FlowState::Review {
                reviewer_id,
                event_id,
                team_id,
                session,
                attendance,
                marks,
                completed_session_ids,
                ..
            },
            FlowEvent::SetRemarks { remarks },
        ) => Ok(Transition::to(FlowState::Review {
            reviewer_id: reviewer_id.clone(),
            event_id: *event_id,
            team_id: *team_id,
            session: session.clone(),
            attendance: attendance.clone(),
            marks: marks.clone(),
            remarks: remarks.filter(|r| !r.trim().is_empty()),
            completed_session_ids: completed_session_ids.clone(),
        })),

        // 提交成功：回到团队选择，活动保持选中，开始下一轮
        (
            FlowState::Review {
                reviewer_id,
                event_id,
                ..
            },
            FlowEvent::SubmitSucceeded,
        ) => Ok(Transition::to(FlowState::Team {
            reviewer_id: reviewer_id.clone(),
            event_id: Some(*event_id),
        })),

        // 提交冲突：丢弃草稿回到场次选择，携带刷新后的完成列表
        (
            FlowState::Review {
                reviewer_id,
                event_id,
                team_id,
                attendance,
                ..
            },
            FlowEvent::SubmitConflicted {
                completed_session_ids,
            },
        ) => {
            let attendance = attendance.keys().map(|id| (id.clone(), true)).collect();
            Ok(Transition::to(FlowState::Session {
                reviewer_id: reviewer_id.clone(),
                event_id: *event_id,
                team_id: *team_id,
                attendance,
                completed_session_ids,
            }))
        }

        _ => Err(FlowError::InvalidTransition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::entities::Criterion;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            id: 11,
            session_number: 1,
            criteria: vec![
                Criterion {
                    id: "CRIT1".to_string(),
                    label: "Creativity".to_string(),
                    max_marks: 10,
                },
                Criterion {
                    id: "CRIT2".to_string(),
                    label: "Execution".to_string(),
                    max_marks: 20,
                },
            ],
        }
    }

    fn review_state() -> FlowState {
        let team = apply(
            &FlowState::Identity,
            FlowEvent::SetIdentity {
                reviewer_id: "judge-a".to_string(),
            },
        )
        .unwrap()
        .state;
        let team = apply(&team, FlowEvent::SelectEvent { event_id: 1 })
            .unwrap()
            .state;
        let session = apply(
            &team,
            FlowEvent::SelectTeam {
                team_id: 5,
                member_ids: vec!["S01".to_string(), "S02".to_string()],
                completed_session_ids: vec![],
            },
        )
        .unwrap()
        .state;
        let attendance = apply(
            &session,
            FlowEvent::SelectSession {
                session: snapshot(),
            },
        )
        .unwrap()
        .state;
        apply(&attendance, FlowEvent::ProceedToReview).unwrap().state
    }

    #[test]
    fn blank_identity_is_rejected() {
        let result = apply(
            &FlowState::Identity,
            FlowEvent::SetIdentity {
                reviewer_id: "   ".to_string(),
            },
        );
        assert_eq!(result.unwrap_err(), FlowError::BlankIdentity);
    }

    #[test]
    fn identity_label_is_trimmed() {
        let transition = apply(
            &FlowState::Identity,
            FlowEvent::SetIdentity {
                reviewer_id: "  judge-a  ".to_string(),
            },
        )
        .unwrap();
        match transition.state {
            FlowState::Team { reviewer_id, .. } => assert_eq!(reviewer_id, "judge-a"),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn selecting_team_without_event_is_rejected() {
        let state = FlowState::Team {
            reviewer_id: "judge-a".to_string(),
            event_id: None,
        };
        let result = apply(
            &state,
            FlowEvent::SelectTeam {
                team_id: 5,
                member_ids: vec!["S01".to_string()],
                completed_session_ids: vec![],
            },
        );
        assert_eq!(result.unwrap_err(), FlowError::NoEventSelected);
    }

    #[test]
    fn selecting_team_initializes_attendance_to_present() {
        let state = FlowState::Team {
            reviewer_id: "judge-a".to_string(),
            event_id: Some(1),
        };
        let transition = apply(
            &state,
            FlowEvent::SelectTeam {
                team_id: 5,
                member_ids: vec!["S01".to_string(), "S02".to_string()],
                completed_session_ids: vec![11],
            },
        )
        .unwrap();
        match transition.state {
            FlowState::Session { attendance, .. } => {
                assert_eq!(attendance.len(), 2);
                assert!(attendance.values().all(|present| *present));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn completed_session_cannot_be_selected_again() {
        let state = FlowState::Session {
            reviewer_id: "judge-a".to_string(),
            event_id: 1,
            team_id: 5,
            attendance: HashMap::from([("S01".to_string(), true)]),
            completed_session_ids: vec![11],
        };
        let result = apply(
            &state,
            FlowEvent::SelectSession {
                session: snapshot(),
            },
        );
        assert_eq!(
            result.unwrap_err(),
            FlowError::SessionAlreadyCompleted { session_id: 11 }
        );
    }

    #[test]
    fn selecting_session_zero_initializes_marks() {
        let state = FlowState::Session {
            reviewer_id: "judge-a".to_string(),
            event_id: 1,
            team_id: 5,
            attendance: HashMap::from([("S01".to_string(), true)]),
            completed_session_ids: vec![],
        };
        let transition = apply(
            &state,
            FlowEvent::SelectSession {
                session: snapshot(),
            },
        )
        .unwrap();
        match transition.state {
            FlowState::Attendance { marks, .. } => {
                assert_eq!(marks.get("CRIT1"), Some(&0));
                assert_eq!(marks.get("CRIT2"), Some(&0));
                assert_eq!(marks.len(), 2);
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn toggle_attendance_flips_only_that_student() {
        let state = FlowState::Attendance {
            reviewer_id: "judge-a".to_string(),
            event_id: 1,
            team_id: 5,
            session: snapshot(),
            attendance: HashMap::from([("S01".to_string(), true), ("S02".to_string(), true)]),
            marks: HashMap::new(),
            completed_session_ids: vec![],
        };
        let transition = apply(
            &state,
            FlowEvent::ToggleAttendance {
                student_id: "S02".to_string(),
            },
        )
        .unwrap();
        match transition.state {
            FlowState::Attendance { attendance, .. } => {
                assert_eq!(attendance.get("S01"), Some(&true));
                assert_eq!(attendance.get("S02"), Some(&false));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn toggle_unknown_student_is_rejected() {
        let state = FlowState::Attendance {
            reviewer_id: "judge-a".to_string(),
            event_id: 1,
            team_id: 5,
            session: snapshot(),
            attendance: HashMap::from([("S01".to_string(), true)]),
            marks: HashMap::new(),
            completed_session_ids: vec![],
        };
        let result = apply(
            &state,
            FlowEvent::ToggleAttendance {
                student_id: "S99".to_string(),
            },
        );
        assert!(matches!(
            result.unwrap_err(),
            FlowError::UnknownStudent { .. }
        ));
    }

    #[test]
    fn mark_above_max_is_clamped_with_notice() {
        let state = review_state();
        let transition = apply(
            &state,
            FlowEvent::SetMark {
                criterion_id: "CRIT1".to_string(),
                value: 12,
            },
        )
        .unwrap();
        assert_eq!(
            transition.notices,
            vec![FlowNotice::MarkClamped {
                criterion_id: "CRIT1".to_string(),
                entered: 12,
                stored: 10,
            }]
        );
        match transition.state {
            FlowState::Review { marks, .. } => assert_eq!(marks.get("CRIT1"), Some(&10)),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn negative_mark_is_clamped_to_zero() {
        let state = review_state();
        let transition = apply(
            &state,
            FlowEvent::SetMark {
                criterion_id: "CRIT2".to_string(),
                value: -3,
            },
        )
        .unwrap();
        assert_eq!(transition.notices.len(), 1);
        match transition.state {
            FlowState::Review { marks, .. } => assert_eq!(marks.get("CRIT2"), Some(&0)),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn in_range_mark_is_stored_without_notice() {
        let state = review_state();
        let transition = apply(
            &state,
            FlowEvent::SetMark {
                criterion_id: "CRIT1".to_string(),
                value: 7,
            },
        )
        .unwrap();
        assert!(transition.notices.is_empty());
        match transition.state {
            FlowState::Review { marks, .. } => assert_eq!(marks.get("CRIT1"), Some(&7)),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn unknown_criterion_is_rejected() {
        let state = review_state();
        let result = apply(
            &state,
            FlowEvent::SetMark {
                criterion_id: "NOPE".to_string(),
                value: 5,
            },
        );
        assert!(matches!(
            result.unwrap_err(),
            FlowError::UnknownCriterion { .. }
        ));
    }

    #[test]
    fn submit_success_loops_back_to_team_with_event_kept() {
        let state = review_state();
        let transition = apply(&state, FlowEvent::SubmitSucceeded).unwrap();
        assert_eq!(
            transition.state,
            FlowState::Team {
                reviewer_id: "judge-a".to_string(),
                event_id: Some(1),
            }
        );
    }

    #[test]
    fn submit_conflict_returns_to_session_with_refreshed_completions() {
        let state = review_state();
        let transition = apply(
            &state,
            FlowEvent::SubmitConflicted {
                completed_session_ids: vec![11],
            },
        )
        .unwrap();
        match transition.state {
            FlowState::Session {
                completed_session_ids,
                attendance,
                ..
            } => {
                // 完成列表已刷新，草稿考勤被丢弃
                assert_eq!(completed_session_ids, vec![11]);
                assert!(attendance.values().all(|present| *present));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn identity_change_is_allowed_from_any_state() {
        let state = review_state();
        let transition = apply(&state, FlowEvent::ChangeIdentity).unwrap();
        assert_eq!(transition.state, FlowState::Identity);
    }

    #[test]
    fn misplaced_event_is_rejected_without_transition() {
        let result = apply(&FlowState::Identity, FlowEvent::ProceedToReview);
        assert_eq!(result.unwrap_err(), FlowError::InvalidTransition);
    }

    #[test]
    fn states_with_identical_snapshots_compare_equal() {
        assert_eq!(review_state(), review_state());

        let mut altered = snapshot();
        altered.criteria[0].max_marks = 99;
        assert_ne!(snapshot(), altered);
    }
}
