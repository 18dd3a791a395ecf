use serde::Deserialize;
use ts_rs::TS;

// 管理员登录请求（共享口令，无用户名体系）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    /// 管理员口令
    pub password: String,
}
