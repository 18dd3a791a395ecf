//! 管理员登录
//!
//! 单一共享口令换取带 "head" 角色的 JWT，没有用户体系。评审人侧
//! 完全不走认证，自报标签即可。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use super::AuthService;
use crate::config::AppConfig;
use crate::models::auth::requests::LoginRequest;
use crate::models::auth::responses::LoginResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

pub async fn login(
    _service: &AuthService,
    _request: &HttpRequest,
    login_request: LoginRequest,
) -> ActixResult<HttpResponse> {
    let config = AppConfig::get();

    if config.auth.admin_password_hash.is_empty() {
        error!("管理员口令未配置, 拒绝登录");
        return Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "管理员口令未配置",
            )),
        );
    }

    // 哈希校验放到阻塞线程池
    let password = login_request.password;
    let hash = config.auth.admin_password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false);

    if !verified {
        warn!("管理员登录失败: 口令错误");
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::AuthFailed, "口令错误")));
    }

    match JwtUtils::generate_admin_token() {
        Ok(access_token) => {
            info!("管理员登录成功");
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                LoginResponse {
                    access_token,
                    expires_in: config.auth.admin_token_expiry * 3600,
                    created_at: chrono::Utc::now(),
                },
                "登录成功",
            )))
        }
        Err(e) => {
            error!("生成 token 失败: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "生成 token 失败",
                )),
            )
        }
    }
}
