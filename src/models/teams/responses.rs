use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::students::entities::Student;

/// 团队及其当前成员
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamWithMembers {
    pub id: i64,
    pub name: String,
    pub members: Vec<Student>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamSearchResponse {
    pub teams: Vec<TeamWithMembers>,
}
