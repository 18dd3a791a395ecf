use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject，固定为 "admin"
    pub role: String, // 角色，管理员为 "head"
    pub exp: usize,   // Expiration time (时间戳)
    pub iat: usize,   // Issued at (签发时间)
}

pub const ADMIN_ROLE: &str = "head";

pub struct JwtUtils;

impl JwtUtils {
    fn get_secret() -> String {
        AppConfig::get().auth.jwt_secret.clone()
    }

    // 生成管理员 Access Token，有效期由配置决定（小时）
    pub fn generate_admin_token() -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        let now = chrono::Utc::now();
        let expiration = now + chrono::Duration::hours(config.auth.admin_token_expiry);

        let claims = Claims {
            sub: "admin".to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let secret = Self::get_secret();
        let encoding_key = EncodingKey::from_secret(secret.as_ref());

        encode(&Header::default(), &claims, &encoding_key)
    }

    // 验证 JWT token
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let secret = Self::get_secret();
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }

    // 验证管理员 token，角色不符视为无效
    pub fn verify_admin_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = Self::verify_token(token)?;
        if claims.role != ADMIN_ROLE {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }
}
