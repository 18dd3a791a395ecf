use serde::{Deserialize, Serialize};

/// 花名册归一化后的学生写入记录
///
/// 批量 upsert 的键为 (team_id, student_id)，调用方负责去重。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub team_id: i64,
    pub student_id: String,
    pub name: String,
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}
