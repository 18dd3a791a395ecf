use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::{EventService, ReportService};
use crate::utils::SafeEventIdI64;

// 懒加载的全局服务实例
static EVENT_SERVICE: Lazy<EventService> = Lazy::new(EventService::new_lazy);
static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

// HTTP处理程序
pub async fn create_event(req: HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.create_event(&req, payload).await
}

pub async fn list_events(req: HttpRequest) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.list_events(&req).await
}

pub async fn delete_event(req: HttpRequest, event_id: SafeEventIdI64) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.delete_event(&req, event_id.0).await
}

pub async fn list_sessions(req: HttpRequest, event_id: SafeEventIdI64) -> ActixResult<HttpResponse> {
    EVENT_SERVICE.list_sessions(&req, event_id.0).await
}

pub async fn export_consolidated_report(
    req: HttpRequest,
    event_id: SafeEventIdI64,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .export_consolidated_report(&req, event_id.0)
        .await
}

pub async fn get_results(req: HttpRequest, event_id: SafeEventIdI64) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.get_results(&req, event_id.0).await
}

pub async fn export_results(
    req: HttpRequest,
    event_id: SafeEventIdI64,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.export_results(&req, event_id.0).await
}

// 配置路由
pub fn configure_events_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/events")
            .service(
                // 评审人侧只读列表公开，创建需要管理员
                web::resource("")
                    .route(web::get().to(list_events))
                    .route(
                        web::post()
                            .to(create_event)
                            .wrap(middlewares::RequireAdmin),
                    ),
            )
            .service(
                web::resource("/{event_id}").route(
                    web::delete()
                        .to(delete_event)
                        .wrap(middlewares::RequireAdmin),
                ),
            )
            .service(web::resource("/{event_id}/sessions").route(web::get().to(list_sessions)))
            .service(
                // 逐学生稠密报表，仅管理员可导出
                web::resource("/{event_id}/report").route(
                    web::get()
                        .to(export_consolidated_report)
                        .wrap(middlewares::RequireAdmin),
                ),
            )
            .service(web::resource("/{event_id}/results").route(web::get().to(get_results)))
            .service(
                web::resource("/{event_id}/results/export").route(web::get().to(export_results)),
            ),
    );
}
