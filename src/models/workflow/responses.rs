use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::workflow::{FlowNotice, FlowState};

/// 单步结果：新状态（拒绝时为原状态）与提示
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/workflow.ts")]
pub struct StepResponse {
    pub state: FlowState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<FlowNotice>,
}
