//! 路径参数安全提取器
//!
//! 将路径中的数字 ID 解析为 i64，非法输入直接以统一响应结构返回 400，
//! 不进入业务处理函数。

use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

macro_rules! define_safe_id_extractor {
    ($name:ident, $param:literal, $label:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl $name {
            pub fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0);

                ready(match parsed {
                    Some(id) => Ok($name(id)),
                    None => {
                        let response = HttpResponse::BadRequest().json(
                            ApiResponse::error_empty(
                                ErrorCode::BadRequest,
                                concat!($label, " 必须是正整数"),
                            ),
                        );
                        Err(InternalError::from_response("无效的路径参数", response).into())
                    }
                })
            }
        }
    };
}

define_safe_id_extractor!(SafeEventIdI64, "event_id", "活动ID");
