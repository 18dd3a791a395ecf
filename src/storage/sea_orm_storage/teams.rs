//! 团队存储操作

use super::SeaOrmStorage;
use crate::entity::students::Column as StudentColumn;
use crate::entity::teams::{ActiveModel as TeamActiveModel, Column as TeamColumn, Entity as Teams};
use crate::entity::{prelude::Students, teams};
use crate::errors::{EvalSystemError, Result};
use crate::models::teams::{entities::Team, responses::TeamWithMembers};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 按名称批量 upsert 团队
    ///
    /// 名称全局唯一：已存在的团队直接复用，不重建。返回全部给定名称的团队。
    pub async fn upsert_teams_by_name_impl(&self, names: &[String]) -> Result<Vec<Team>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let models: Vec<TeamActiveModel> = names
            .iter()
            .map(|name| TeamActiveModel {
                name: Set(name.clone()),
                ..Default::default()
            })
            .collect();

        Teams::insert_many(models)
            .on_conflict(
                OnConflict::column(TeamColumn::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("写入团队失败: {e}")))?;

        let teams = Teams::find()
            .filter(TeamColumn::Name.is_in(names.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询团队失败: {e}")))?;

        Ok(teams.into_iter().map(|m| m.into_team()).collect())
    }

    /// 按团队名或成员名搜索
    ///
    /// 两路独立查询：团队名模糊匹配、成员名模糊匹配，结果按团队ID去重合并，
    /// 团队名命中的排在前面。
    pub async fn search_teams_impl(&self, query: &str) -> Result<Vec<TeamWithMembers>> {
        let escaped = escape_like_pattern(query.trim());

        let by_name = Teams::find()
            .filter(TeamColumn::Name.contains(&escaped))
            .order_by_asc(TeamColumn::Name)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("搜索团队失败: {e}")))?;

        let by_member = Students::find()
            .filter(StudentColumn::Name.contains(&escaped))
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("搜索成员失败: {e}")))?;

        let mut team_ids: Vec<i64> = Vec::new();
        for team in &by_name {
            if !team_ids.contains(&team.id) {
                team_ids.push(team.id);
            }
        }
        for student in &by_member {
            if !team_ids.contains(&student.team_id) {
                team_ids.push(student.team_id);
            }
        }

        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        let teams_with_students = Teams::find()
            .filter(TeamColumn::Id.is_in(team_ids.clone()))
            .find_with_related(Students)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询团队成员失败: {e}")))?;

        // 恢复去重时确定的顺序
        let mut results: Vec<Option<TeamWithMembers>> = vec![None; team_ids.len()];
        for (team, students) in teams_with_students {
            let position = team_ids.iter().position(|id| *id == team.id);
            if let Some(index) = position {
                results[index] = Some(Self::assemble_team(team, students)?);
            }
        }

        Ok(results.into_iter().flatten().collect())
    }

    /// 获取团队及其成员
    pub async fn get_team_with_members_impl(
        &self,
        team_id: i64,
    ) -> Result<Option<TeamWithMembers>> {
        let mut found = Teams::find_by_id(team_id)
            .find_with_related(Students)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询团队失败: {e}")))?;

        match found.pop() {
            Some((team, students)) => Ok(Some(Self::assemble_team(team, students)?)),
            None => Ok(None),
        }
    }

    /// 列出全部团队及成员
    pub async fn list_teams_with_members_impl(&self) -> Result<Vec<TeamWithMembers>> {
        let teams_with_students = Teams::find()
            .order_by_asc(TeamColumn::Name)
            .find_with_related(Students)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询团队失败: {e}")))?;

        teams_with_students
            .into_iter()
            .map(|(team, students)| Self::assemble_team(team, students))
            .collect()
    }

    fn assemble_team(
        team: teams::Model,
        students: Vec<crate::entity::students::Model>,
    ) -> Result<TeamWithMembers> {
        let members = students
            .into_iter()
            .map(|m| m.into_student())
            .collect::<Result<Vec<_>>>()?;

        Ok(TeamWithMembers {
            id: team.id,
            name: team.name,
            members,
        })
    }
}
