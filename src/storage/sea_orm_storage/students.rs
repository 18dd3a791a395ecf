//! 学生存储操作

use super::SeaOrmStorage;
use crate::entity::students::{
    ActiveModel as StudentActiveModel, Column as StudentColumn, Entity as Students,
};
use crate::errors::{EvalSystemError, Result};
use crate::models::students::{entities::Student, requests::NewStudent};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 按 (team_id, student_id) 批量 upsert 学生
    ///
    /// 已存在的记录更新姓名与附加信息。批内重复键必须在调用前去重，
    /// 否则同一条语句内的冲突行为由数据库决定。
    pub async fn upsert_students_impl(&self, batch: &[NewStudent]) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut models = Vec::with_capacity(batch.len());
        for student in batch {
            let details = match &student.details {
                Some(map) => Some(serde_json::to_string(map).map_err(|e| {
                    EvalSystemError::serialization(format!("序列化学生附加信息失败: {e}"))
                })?),
                None => None,
            };
            models.push(StudentActiveModel {
                team_id: Set(student.team_id),
                student_id: Set(student.student_id.clone()),
                name: Set(student.name.clone()),
                details: Set(details),
                ..Default::default()
            });
        }

        Students::insert_many(models)
            .on_conflict(
                OnConflict::columns([StudentColumn::TeamId, StudentColumn::StudentId])
                    .update_columns([StudentColumn::Name, StudentColumn::Details])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("写入学生失败: {e}")))?;

        Ok(batch.len())
    }

    /// 列出团队成员
    pub async fn list_students_by_team_impl(&self, team_id: i64) -> Result<Vec<Student>> {
        let students = Students::find()
            .filter(StudentColumn::TeamId.eq(team_id))
            .order_by_asc(StudentColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询团队成员失败: {e}")))?;

        students.into_iter().map(|m| m.into_student()).collect()
    }
}
