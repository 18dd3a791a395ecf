//! 评审记录实体
//!
//! `attendance` 与 `marks` 均为 JSON 文本：
//! - attendance: `{ "<学号>": bool }`
//! - marks: `{ "<标准 id>": 分数 }`

use sea_orm::entity::prelude::*;

use crate::errors::EvalSystemError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub team_id: i64,
    pub session_id: i64,
    #[sea_orm(column_type = "Text")]
    pub attendance: String,
    #[sea_orm(column_type = "Text")]
    pub marks: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    pub reviewer_id: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::review_sessions::Entity",
        from = "Column::SessionId",
        to = "super::review_sessions::Column::Id"
    )]
    Session,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::review_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_review(self) -> crate::errors::Result<crate::models::reviews::entities::Review> {
        use crate::models::reviews::entities::Review;
        use chrono::{DateTime, Utc};

        let attendance = serde_json::from_str(&self.attendance).map_err(|e| {
            EvalSystemError::serialization(format!("评审 {} 考勤反序列化失败: {e}", self.id))
        })?;
        let marks = serde_json::from_str(&self.marks).map_err(|e| {
            EvalSystemError::serialization(format!("评审 {} 评分反序列化失败: {e}", self.id))
        })?;

        Ok(Review {
            id: self.id,
            team_id: self.team_id,
            session_id: self.session_id,
            attendance,
            marks,
            remarks: self.remarks,
            reviewer_id: self.reviewer_id,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        })
    }
}
