use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 一次已接受的评审提交
///
/// 每个 (team_id, session_id) 至多存在一条，由存储层唯一索引兜底。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct Review {
    pub id: i64,
    pub team_id: i64,
    pub session_id: i64,
    // 学号 -> 是否到场
    pub attendance: HashMap<String, bool>,
    // 评分标准 id -> 分数，已夹紧到 [0, max_marks]
    pub marks: HashMap<String, i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    // 评审人自报标签，不做身份校验
    pub reviewer_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Review {
    /// 本次提交的总分
    pub fn total_marks(&self) -> i64 {
        self.marks.values().map(|m| *m as i64).sum()
    }
}
