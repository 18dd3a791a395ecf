//! 业务模型层
//!
//! 各子模块按资源划分，`common` 提供统一响应结构与错误码。

pub mod auth;
pub mod common;
pub mod events;
pub mod reviews;
pub mod students;
pub mod system;
pub mod teams;
pub mod workflow;

pub use common::response::ApiResponse;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 应用启动时间，注入 app_data 供状态上报使用
#[derive(Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 统一业务错误码
///
/// 0 表示成功；1xxx 为通用错误；2xxx 认证；3xxx 活动与场次；
/// 4xxx 花名册导入；5xxx 团队；6xxx 评审；7xxx 报表导出。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/error_code.ts")]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    InternalServerError = 1001,
    NotFound = 1002,
    Unauthorized = 1003,
    Forbidden = 1004,
    RateLimitExceeded = 1005,

    // 认证
    AuthFailed = 2001,

    // 活动与场次
    EventNotFound = 3001,
    EventCreationFailed = 3002,
    EventDeleteFailed = 3003,
    SessionNotFound = 3004,

    // 花名册导入
    ImportFileParseFailed = 4001,
    ImportFileMissingColumn = 4002,
    ImportFileDataInvalid = 4003,
    ImportFileEmpty = 4004,

    // 团队
    TeamNotFound = 5001,

    // 评审
    ReviewAlreadySubmitted = 6001,
    ReviewSubmitFailed = 6002,
    ReviewDataInvalid = 6003,

    // 报表导出
    ExportFailed = 7001,
}
