use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::workflow::requests::StepRequest;
use crate::services::WorkflowService;

// 懒加载的全局 WorkflowService 实例
static WORKFLOW_SERVICE: Lazy<WorkflowService> = Lazy::new(WorkflowService::new_lazy);

pub async fn step(req: HttpRequest, step_data: web::Json<StepRequest>) -> ActixResult<HttpResponse> {
    WORKFLOW_SERVICE.step(&req, step_data.into_inner()).await
}

// 配置路由
pub fn configure_workflow_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1/workflow").route("/step", web::post().to(step)));
}
