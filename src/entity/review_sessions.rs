//! 评审场次实体
//!
//! `criteria` 列为 JSON 文本，反序列化为业务模型中的评分标准列表。

use sea_orm::entity::prelude::*;

use crate::errors::EvalSystemError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "review_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_id: i64,
    pub session_number: i32,
    #[sea_orm(column_type = "Text")]
    pub criteria: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::evaluation_events::Entity",
        from = "Column::EventId",
        to = "super::evaluation_events::Column::Id"
    )]
    Event,
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::evaluation_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_session(self) -> crate::errors::Result<crate::models::events::entities::ReviewSession> {
        use crate::models::events::entities::ReviewSession;

        let criteria = serde_json::from_str(&self.criteria).map_err(|e| {
            EvalSystemError::serialization(format!("场次 {} 评分标准反序列化失败: {e}", self.id))
        })?;

        Ok(ReviewSession {
            id: self.id,
            event_id: self.event_id,
            session_number: self.session_number,
            criteria,
        })
    }
}
