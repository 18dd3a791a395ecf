use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::teams::requests::TeamSearchParams;
use crate::services::TeamService;

// 懒加载的全局 TeamService 实例
static TEAM_SERVICE: Lazy<TeamService> = Lazy::new(TeamService::new_lazy);

pub async fn search_teams(
    req: HttpRequest,
    query: web::Query<TeamSearchParams>,
) -> ActixResult<HttpResponse> {
    TEAM_SERVICE.search_teams(&req, query.into_inner().q).await
}

// 配置路由
pub fn configure_teams_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teams").route("/search", web::get().to(search_teams)),
    );
}
