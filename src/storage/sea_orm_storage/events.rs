//! 活动与场次存储操作

use super::SeaOrmStorage;
use crate::entity::evaluation_events::{
    ActiveModel as EventActiveModel, Column as EventColumn, Entity as EvaluationEvents,
};
use crate::entity::review_sessions::{
    ActiveModel as SessionActiveModel, Column as SessionColumn, Entity as ReviewSessions,
};
use crate::errors::{EvalSystemError, Result};
use crate::models::events::entities::{Criterion, EvaluationEvent, ReviewSession};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建活动
    pub async fn create_event_impl(
        &self,
        name: &str,
        num_sessions: i32,
    ) -> Result<EvaluationEvent> {
        let now = chrono::Utc::now().timestamp();

        let model = EventActiveModel {
            name: Set(name.to_string()),
            num_sessions: Set(num_sessions),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("创建活动失败: {e}")))?;

        Ok(result.into_event())
    }

    /// 批量创建场次，编号从 1 开始按给定顺序分配
    pub async fn create_sessions_impl(
        &self,
        event_id: i64,
        criteria_per_session: &[Vec<Criterion>],
    ) -> Result<Vec<ReviewSession>> {
        if criteria_per_session.is_empty() {
            return Ok(Vec::new());
        }

        let mut models = Vec::with_capacity(criteria_per_session.len());
        for (index, criteria) in criteria_per_session.iter().enumerate() {
            let criteria_json = serde_json::to_string(criteria).map_err(|e| {
                EvalSystemError::serialization(format!("序列化评分标准失败: {e}"))
            })?;
            models.push(SessionActiveModel {
                event_id: Set(event_id),
                session_number: Set(index as i32 + 1),
                criteria: Set(criteria_json),
                ..Default::default()
            });
        }

        ReviewSessions::insert_many(models)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("创建场次失败: {e}")))?;

        self.list_sessions_by_event_impl(event_id).await
    }

    /// 列出所有活动，最新创建的在前
    pub async fn list_events_impl(&self) -> Result<Vec<EvaluationEvent>> {
        let events = EvaluationEvents::find()
            .order_by_desc(EventColumn::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询活动列表失败: {e}")))?;

        Ok(events.into_iter().map(|m| m.into_event()).collect())
    }

    /// 通过 ID 获取活动
    pub async fn get_event_by_id_impl(&self, event_id: i64) -> Result<Option<EvaluationEvent>> {
        let result = EvaluationEvents::find_by_id(event_id)
            .one(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询活动失败: {e}")))?;

        Ok(result.map(|m| m.into_event()))
    }

    /// 删除活动，场次与评审由外键级联删除
    pub async fn delete_event_impl(&self, event_id: i64) -> Result<bool> {
        let result = EvaluationEvents::delete_by_id(event_id)
            .exec(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("删除活动失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 列出活动下全部场次，按场次编号升序
    pub async fn list_sessions_by_event_impl(&self, event_id: i64) -> Result<Vec<ReviewSession>> {
        let sessions = ReviewSessions::find()
            .filter(SessionColumn::EventId.eq(event_id))
            .order_by_asc(SessionColumn::SessionNumber)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询场次列表失败: {e}")))?;

        sessions.into_iter().map(|m| m.into_session()).collect()
    }

    /// 通过 ID 获取场次
    pub async fn get_session_by_id_impl(&self, session_id: i64) -> Result<Option<ReviewSession>> {
        let result = ReviewSessions::find_by_id(session_id)
            .one(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询场次失败: {e}")))?;

        result.map(|m| m.into_session()).transpose()
    }
}
