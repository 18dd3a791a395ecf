use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::workflow::FlowState;

/// 客户端动作，只携带标识，数据由服务端补全
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/workflow.ts")]
pub enum FlowAction {
    SetIdentity { reviewer_id: String },
    ChangeIdentity,
    SelectEvent { event_id: i64 },
    SelectTeam { team_id: i64 },
    SelectSession { session_id: i64 },
    ToggleAttendance { student_id: String },
    ProceedToReview,
    BackToAttendance,
    BackToSession,
    SetMark { criterion_id: String, value: i32 },
    SetRemarks { remarks: Option<String> },
    Submit,
}

/// 单步请求：当前状态 + 动作，服务端不保存会话
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/workflow.ts")]
pub struct StepRequest {
    pub state: FlowState,
    pub action: FlowAction,
}
