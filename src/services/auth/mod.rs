pub mod login;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::auth::requests::LoginRequest;

pub struct AuthService;

impl AuthService {
    pub fn new_lazy() -> Self {
        Self
    }

    // 管理员登录
    pub async fn login(
        &self,
        request: &HttpRequest,
        login_request: LoginRequest,
    ) -> ActixResult<HttpResponse> {
        login::login(self, request, login_request).await
    }
}
