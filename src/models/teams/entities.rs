use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct Team {
    // 团队ID
    pub id: i64,
    // 团队名称，全局唯一，跨活动复用
    pub name: String,
}
