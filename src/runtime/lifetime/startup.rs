use crate::config::AppConfig;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::warn;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 检查管理员口令配置
/// 口令哈希缺失时服务仍可启动，但所有管理端点都会拒绝登录
fn check_admin_credentials() {
    let config = AppConfig::get();
    if config.auth.admin_password_hash.is_empty() {
        warn!("==========================================================");
        warn!("  ADMIN_PASSWORD_HASH IS NOT CONFIGURED");
        warn!("  Admin login will be rejected until it is set.");
        warn!("  Generate one with: echo -n <password> | argon2 ...");
        warn!("==========================================================");
    }
}

/// 准备服务器启动的上下文
/// 包括存储和路由配置等
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    check_admin_credentials();

    StartupContext { storage }
}
