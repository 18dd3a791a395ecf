use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::Review;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct ReviewSubmittedResponse {
    pub review: Review,
}

/// 汇总视图中的一行：每个已提交评审的 (团队, 场次) 一行
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct CombinedResultRow {
    pub team_name: String,
    pub session_number: i32,
    // 形如 "10 / 10"
    pub score_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub reviewer_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct CombinedResultsResponse {
    pub rows: Vec<CombinedResultRow>,
}
