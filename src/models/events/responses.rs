use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{EvaluationEvent, ReviewSession};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct EventListResponse {
    pub events: Vec<EvaluationEvent>,
}

/// 创建活动并导入花名册的结果
///
/// 学生批量写入失败时活动本身仍然创建成功，失败信息以 warnings 形式返回。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct EventCreatedResponse {
    pub event: EvaluationEvent,
    pub sessions: Vec<ReviewSession>,
    pub teams_created: usize,
    pub students_created: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct SessionListResponse {
    pub sessions: Vec<ReviewSession>,
}
