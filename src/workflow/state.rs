//! 评审流程状态类型
//!
//! 状态以带标签的枚举表示，只携带该状态下有效的字段，整个状态随请求
//! 往返于客户端与服务端之间，服务端不保存会话。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::events::entities::Criterion;

/// 场次快照，选定场次后随状态携带，避免每步重查评分标准
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/workflow.ts")]
pub struct SessionSnapshot {
    pub id: i64,
    pub session_number: i32,
    pub criteria: Vec<Criterion>,
}

/// 评审流程状态
///
/// identity → team → session → attendance → review → (提交) → team，
/// 提交冲突时回到 session；任意状态可回到 identity。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "step", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/workflow.ts")]
pub enum FlowState {
    /// 填写评审人标签
    Identity,
    /// 选择活动与团队
    Team {
        reviewer_id: String,
        event_id: Option<i64>,
    },
    /// 选择场次；考勤已按「全员到场」初始化
    Session {
        reviewer_id: String,
        event_id: i64,
        team_id: i64,
        attendance: HashMap<String, bool>,
        completed_session_ids: Vec<i64>,
    },
    /// 核对考勤
    Attendance {
        reviewer_id: String,
        event_id: i64,
        team_id: i64,
        session: SessionSnapshot,
        attendance: HashMap<String, bool>,
        marks: HashMap<String, i32>,
        completed_session_ids: Vec<i64>,
    },
    /// 逐项打分并提交
    Review {
        reviewer_id: String,
        event_id: i64,
        team_id: i64,
        session: SessionSnapshot,
        attendance: HashMap<String, bool>,
        marks: HashMap<String, i32>,
        remarks: Option<String>,
        completed_session_ids: Vec<i64>,
    },
}

/// 流程事件
///
/// 由服务层根据客户端动作补全数据后构造：例如选择团队时附带成员学号、
/// 已完成场次；提交结果以 SubmitSucceeded / SubmitConflicted 回灌。
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    SetIdentity {
        reviewer_id: String,
    },
    ChangeIdentity,
    SelectEvent {
        event_id: i64,
    },
    SelectTeam {
        team_id: i64,
        member_ids: Vec<String>,
        completed_session_ids: Vec<i64>,
    },
    SelectSession {
        session: SessionSnapshot,
    },
    ToggleAttendance {
        student_id: String,
    },
    ProceedToReview,
    BackToAttendance,
    BackToSession,
    SetMark {
        criterion_id: String,
        value: i32,
    },
    SetRemarks {
        remarks: Option<String>,
    },
    SubmitSucceeded,
    SubmitConflicted {
        completed_session_ids: Vec<i64>,
    },
}

/// 转移附带的提示，不阻止转移本身
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/workflow.ts")]
pub enum FlowNotice {
    /// 分数超出范围，已强制回到边界值
    MarkClamped {
        criterion_id: String,
        entered: i32,
        stored: i32,
    },
}

/// 成功的转移：新状态加零个或多个提示
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: FlowState,
    pub notices: Vec<FlowNotice>,
}

impl Transition {
    pub fn to(state: FlowState) -> Self {
        Self {
            state,
            notices: Vec::new(),
        }
    }

    pub fn with_notice(state: FlowState, notice: FlowNotice) -> Self {
        Self {
            state,
            notices: vec![notice],
        }
    }
}

/// 被拒绝的转移，状态保持不变
#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    /// 评审人标签为空
    BlankIdentity,
    /// 尚未选择活动
    NoEventSelected,
    /// 该场次已有评审提交
    SessionAlreadyCompleted { session_id: i64 },
    /// 学号不属于当前团队
    UnknownStudent { student_id: String },
    /// 评分标准不属于当前场次
    UnknownCriterion { criterion_id: String },
    /// 事件在当前状态下不可用
    InvalidTransition,
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowError::BlankIdentity => write!(f, "评审人标签不能为空"),
            FlowError::NoEventSelected => write!(f, "请先选择活动"),
            FlowError::SessionAlreadyCompleted { session_id } => {
                write!(f, "场次 {session_id} 已有评审提交")
            }
            FlowError::UnknownStudent { student_id } => {
                write!(f, "学号 {student_id} 不属于当前团队")
            }
            FlowError::UnknownCriterion { criterion_id } => {
                write!(f, "评分标准 {criterion_id} 不属于当前场次")
            }
            FlowError::InvalidTransition => write!(f, "当前步骤不支持该操作"),
        }
    }
}

impl std::error::Error for FlowError {}
