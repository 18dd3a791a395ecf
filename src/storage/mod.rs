use std::sync::Arc;

use crate::models::{
    events::entities::{Criterion, EvaluationEvent, ReviewSession},
    reviews::{entities::Review, requests::SubmitReviewRequest},
    students::{entities::Student, requests::NewStudent},
    teams::{entities::Team, responses::TeamWithMembers},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 活动与场次
    // 创建活动
    async fn create_event(&self, name: &str, num_sessions: i32) -> Result<EvaluationEvent>;
    // 批量创建场次，编号按给定顺序从 1 开始
    async fn create_sessions(
        &self,
        event_id: i64,
        criteria_per_session: &[Vec<Criterion>],
    ) -> Result<Vec<ReviewSession>>;
    // 列出所有活动，最新创建的在前
    async fn list_events(&self) -> Result<Vec<EvaluationEvent>>;
    // 通过ID获取活动
    async fn get_event_by_id(&self, event_id: i64) -> Result<Option<EvaluationEvent>>;
    // 删除活动，级联删除其场次与评审
    async fn delete_event(&self, event_id: i64) -> Result<bool>;
    // 列出活动下全部场次，按场次编号升序
    async fn list_sessions_by_event(&self, event_id: i64) -> Result<Vec<ReviewSession>>;
    // 通过ID获取场次
    async fn get_session_by_id(&self, session_id: i64) -> Result<Option<ReviewSession>>;

    /// 团队
    // 按名称批量 upsert，返回全部给定名称对应的团队
    async fn upsert_teams_by_name(&self, names: &[String]) -> Result<Vec<Team>>;
    // 按团队名或成员名搜索，两路结果按团队ID去重合并
    async fn search_teams(&self, query: &str) -> Result<Vec<TeamWithMembers>>;
    // 获取团队及其成员
    async fn get_team_with_members(&self, team_id: i64) -> Result<Option<TeamWithMembers>>;
    // 列出全部团队及成员（报表装配用）
    async fn list_teams_with_members(&self) -> Result<Vec<TeamWithMembers>>;

    /// 学生
    // 按 (team_id, student_id) 批量 upsert，批内不得有重复键
    async fn upsert_students(&self, batch: &[NewStudent]) -> Result<usize>;
    // 列出团队成员
    async fn list_students_by_team(&self, team_id: i64) -> Result<Vec<Student>>;

    /// 评审
    // 查询 (团队, 场次) 的已有提交
    async fn find_review(&self, team_id: i64, session_id: i64) -> Result<Option<Review>>;
    // 插入评审；(team_id, session_id) 唯一索引冲突映射为 ReviewConflict
    async fn insert_review(&self, request: SubmitReviewRequest) -> Result<Review>;
    // 列出某团队在活动内已完成的场次ID
    async fn list_completed_session_ids(&self, team_id: i64, event_id: i64) -> Result<Vec<i64>>;
    // 列出活动内全部评审
    async fn list_reviews_for_event(&self, event_id: i64) -> Result<Vec<Review>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
