use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

/// 系统状态响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SystemStatusResponse {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: i64,
    pub started_at: DateTime<Utc>,
}
