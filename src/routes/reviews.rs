use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::reviews::requests::SubmitReviewRequest;
use crate::services::ReviewService;

// 懒加载的全局 ReviewService 实例
static REVIEW_SERVICE: Lazy<ReviewService> = Lazy::new(ReviewService::new_lazy);

pub async fn submit_review(
    req: HttpRequest,
    review_data: web::Json<SubmitReviewRequest>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE
        .submit_review(&req, review_data.into_inner())
        .await
}

// 配置路由
pub fn configure_reviews_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reviews").service(
            web::resource("")
                .wrap(middlewares::RateLimit::submit())
                .route(web::post().to(submit_review)),
        ),
    );
}
