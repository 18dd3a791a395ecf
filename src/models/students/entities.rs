use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct Student {
    // 学生主键
    pub id: i64,
    // 所属团队ID
    pub team_id: i64,
    // 花名册中的学号（团队内唯一）
    pub student_id: String,
    // 姓名
    pub name: String,
    // 原始行的其余列，仅作留存，不参与业务逻辑
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}
