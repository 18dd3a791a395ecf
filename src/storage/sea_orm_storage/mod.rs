//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod events;
mod reviews;
mod students;
mod teams;

use crate::config::AppConfig;
use crate::errors::{EvalSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EvalSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| EvalSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| EvalSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EvalSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 判断底层错误是否为唯一约束冲突
    pub(crate) fn is_unique_violation(message: &str) -> bool {
        message.contains("UNIQUE constraint failed")
            || message.contains("duplicate key value")
            || message.contains("Duplicate entry")
    }
}

// Storage trait 实现
use crate::models::{
    events::entities::{Criterion, EvaluationEvent, ReviewSession},
    reviews::{entities::Review, requests::SubmitReviewRequest},
    students::{entities::Student, requests::NewStudent},
    teams::{entities::Team, responses::TeamWithMembers},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 活动与场次
    async fn create_event(&self, name: &str, num_sessions: i32) -> Result<EvaluationEvent> {
        self.create_event_impl(name, num_sessions).await
    }

    async fn create_sessions(
        &self,
        event_id: i64,
        criteria_per_session: &[Vec<Criterion>],
    ) -> Result<Vec<ReviewSession>> {
        self.create_sessions_impl(event_id, criteria_per_session)
            .await
    }

    async fn list_events(&self) -> Result<Vec<EvaluationEvent>> {
        self.list_events_impl().await
    }

    async fn get_event_by_id(&self, event_id: i64) -> Result<Option<EvaluationEvent>> {
        self.get_event_by_id_impl(event_id).await
    }

    async fn delete_event(&self, event_id: i64) -> Result<bool> {
        self.delete_event_impl(event_id).await
    }

    async fn list_sessions_by_event(&self, event_id: i64) -> Result<Vec<ReviewSession>> {
        self.list_sessions_by_event_impl(event_id).await
    }

    async fn get_session_by_id(&self, session_id: i64) -> Result<Option<ReviewSession>> {
        self.get_session_by_id_impl(session_id).await
    }

    // 团队
    async fn upsert_teams_by_name(&self, names: &[String]) -> Result<Vec<Team>> {
        self.upsert_teams_by_name_impl(names).await
    }

    async fn search_teams(&self, query: &str) -> Result<Vec<TeamWithMembers>> {
        self.search_teams_impl(query).await
    }

    async fn get_team_with_members(&self, team_id: i64) -> Result<Option<TeamWithMembers>> {
        self.get_team_with_members_impl(team_id).await
    }

    async fn list_teams_with_members(&self) -> Result<Vec<TeamWithMembers>> {
        self.list_teams_with_members_impl().await
    }

    // 学生
    async fn upsert_students(&self, batch: &[NewStudent]) -> Result<usize> {
        self.upsert_students_impl(batch).await
    }

    async fn list_students_by_team(&self, team_id: i64) -> Result<Vec<Student>> {
        self.list_students_by_team_impl(team_id).await
    }

    // 评审
    async fn find_review(&self, team_id: i64, session_id: i64) -> Result<Option<Review>> {
        self.find_review_impl(team_id, session_id).await
    }

    async fn insert_review(&self, request: SubmitReviewRequest) -> Result<Review> {
        self.insert_review_impl(request).await
    }

    async fn list_completed_session_ids(&self, team_id: i64, event_id: i64) -> Result<Vec<i64>> {
        self.list_completed_session_ids_impl(team_id, event_id)
            .await
    }

    async fn list_reviews_for_event(&self, event_id: i64) -> Result<Vec<Review>> {
        self.list_reviews_for_event_impl(event_id).await
    }
}
