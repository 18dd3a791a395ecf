use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 创建活动请求（multipart 中 `payload` 字段的 JSON 内容）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct CreateEventRequest {
    pub name: String,
    pub sessions: Vec<SessionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct SessionSpec {
    pub criteria: Vec<CriterionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct CriterionSpec {
    pub label: String,
    pub max_marks: i32,
}
