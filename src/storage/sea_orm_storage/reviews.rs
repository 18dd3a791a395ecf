//! 评审存储操作
//!
//! (team_id, session_id) 的唯一索引是重复提交的最终裁决：应用层的
//! 预检查只是快速路径，索引冲突一律映射为 ReviewConflict。

use super::SeaOrmStorage;
use crate::entity::prelude::ReviewSessions;
use crate::entity::review_sessions::Column as SessionColumn;
use crate::entity::reviews::{
    ActiveModel as ReviewActiveModel, Column as ReviewColumn, Entity as Reviews,
};
use crate::errors::{EvalSystemError, Result};
use crate::models::reviews::{entities::Review, requests::SubmitReviewRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 查询 (团队, 场次) 的已有提交
    pub async fn find_review_impl(&self, team_id: i64, session_id: i64) -> Result<Option<Review>> {
        let result = Reviews::find()
            .filter(ReviewColumn::TeamId.eq(team_id))
            .filter(ReviewColumn::SessionId.eq(session_id))
            .one(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询评审失败: {e}")))?;

        result.map(|m| m.into_review()).transpose()
    }

    /// 插入评审
    pub async fn insert_review_impl(&self, request: SubmitReviewRequest) -> Result<Review> {
        let now = chrono::Utc::now().timestamp();

        let attendance = serde_json::to_string(&request.attendance)
            .map_err(|e| EvalSystemError::serialization(format!("序列化考勤失败: {e}")))?;
        let marks = serde_json::to_string(&request.marks)
            .map_err(|e| EvalSystemError::serialization(format!("序列化评分失败: {e}")))?;

        let model = ReviewActiveModel {
            team_id: Set(request.team_id),
            session_id: Set(request.session_id),
            attendance: Set(attendance),
            marks: Set(marks),
            remarks: Set(request.remarks),
            reviewer_id: Set(request.reviewer_id),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| Self::handle_review_insert_error(e, request.team_id, request.session_id))?;

        result.into_review()
    }

    /// 列出某团队在活动内已完成的场次ID
    pub async fn list_completed_session_ids_impl(
        &self,
        team_id: i64,
        event_id: i64,
    ) -> Result<Vec<i64>> {
        let session_ids: Vec<i64> = ReviewSessions::find()
            .filter(SessionColumn::EventId.eq(event_id))
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询场次失败: {e}")))?
            .into_iter()
            .map(|m| m.id)
            .collect();

        if session_ids.is_empty() {
            return Ok(Vec::new());
        }

        let reviews = Reviews::find()
            .filter(ReviewColumn::TeamId.eq(team_id))
            .filter(ReviewColumn::SessionId.is_in(session_ids))
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询评审失败: {e}")))?;

        Ok(reviews.into_iter().map(|m| m.session_id).collect())
    }

    /// 列出活动内全部评审
    pub async fn list_reviews_for_event_impl(&self, event_id: i64) -> Result<Vec<Review>> {
        let session_ids: Vec<i64> = ReviewSessions::find()
            .filter(SessionColumn::EventId.eq(event_id))
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询场次失败: {e}")))?
            .into_iter()
            .map(|m| m.id)
            .collect();

        if session_ids.is_empty() {
            return Ok(Vec::new());
        }

        let reviews = Reviews::find()
            .filter(ReviewColumn::SessionId.is_in(session_ids))
            .order_by_asc(ReviewColumn::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询评审失败: {e}")))?;

        reviews.into_iter().map(|m| m.into_review()).collect()
    }

    fn handle_review_insert_error(
        e: sea_orm::DbErr,
        team_id: i64,
        session_id: i64,
    ) -> EvalSystemError {
        let message = e.to_string();
        if Self::is_unique_violation(&message) {
            EvalSystemError::review_conflict(format!(
                "团队 {team_id} 在场次 {session_id} 已有评审提交"
            ))
        } else {
            EvalSystemError::database_operation(format!("插入评审失败: {e}"))
        }
    }
}
