use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct EvaluationEvent {
    // 活动ID
    pub id: i64,
    // 活动名称
    pub name: String,
    // 评审场次数
    pub num_sessions: i32,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct ReviewSession {
    // 场次ID
    pub id: i64,
    // 所属活动ID
    pub event_id: i64,
    // 场次编号，活动内从 1 开始
    pub session_number: i32,
    // 评分标准，按录入顺序
    pub criteria: Vec<Criterion>,
}

// 单项评分标准
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/event.ts")]
pub struct Criterion {
    pub id: String,
    pub label: String,
    pub max_marks: i32,
}

impl ReviewSession {
    /// 本场次满分总和
    pub fn max_total(&self) -> i64 {
        self.criteria.iter().map(|c| c.max_marks as i64).sum()
    }
}
