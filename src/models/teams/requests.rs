use serde::Deserialize;
use ts_rs::TS;

/// 团队搜索查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamSearchParams {
    /// 搜索关键字，匹配团队名或成员姓名
    pub q: String,
}
