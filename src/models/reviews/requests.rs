use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct SubmitReviewRequest {
    pub team_id: i64,
    pub session_id: i64,
    pub reviewer_id: String,
    pub attendance: HashMap<String, bool>,
    pub marks: HashMap<String, i32>,
    #[serde(default)]
    pub remarks: Option<String>,
}
