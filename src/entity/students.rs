//! 学生实体
//!
//! `details` 列保存花名册中未被识别的其余列，JSON 文本，可为空。

use sea_orm::entity::prelude::*;

use crate::errors::EvalSystemError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub team_id: i64,
    pub student_id: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id"
    )]
    Team,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student(self) -> crate::errors::Result<crate::models::students::entities::Student> {
        use crate::models::students::entities::Student;

        let details = match &self.details {
            Some(raw) => serde_json::from_str(raw).map_err(|e| {
                EvalSystemError::serialization(format!("学生 {} 附加信息反序列化失败: {e}", self.id))
            })?,
            None => None,
        };

        Ok(Student {
            id: self.id,
            team_id: self.team_id,
            student_id: self.student_id,
            name: self.name,
            details,
        })
    }
}
