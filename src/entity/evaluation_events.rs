//! 评估活动实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub num_sessions: i32,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review_sessions::Entity")]
    ReviewSessions,
}

impl Related<super::review_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_event(self) -> crate::models::events::entities::EvaluationEvent {
        use crate::models::events::entities::EvaluationEvent;
        use chrono::{DateTime, Utc};

        EvaluationEvent {
            id: self.id,
            name: self.name,
            num_sessions: self.num_sessions,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
