use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建评估活动表
        manager
            .create_table(
                Table::create()
                    .table(EvaluationEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EvaluationEvents::Name).string().not_null())
                    .col(
                        ColumnDef::new(EvaluationEvents::NumSessions)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationEvents::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评审场次表
        manager
            .create_table(
                Table::create()
                    .table(ReviewSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReviewSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReviewSessions::EventId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewSessions::SessionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReviewSessions::Criteria).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ReviewSessions::Table, ReviewSessions::EventId)
                            .to(EvaluationEvents::Table, EvaluationEvents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 场次编号在活动内唯一
        manager
            .create_index(
                Index::create()
                    .name("idx_review_sessions_event_number")
                    .table(ReviewSessions::Table)
                    .col(ReviewSessions::EventId)
                    .col(ReviewSessions::SessionNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 创建队伍表（队名全局唯一，跨活动复用）
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teams::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teams::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        // 创建学生表
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(Students::StudentId).string().not_null())
                    .col(ColumnDef::new(Students::Name).string().not_null())
                    .col(ColumnDef::new(Students::Details).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 学号在队伍内唯一，作为 upsert 冲突键
        manager
            .create_index(
                Index::create()
                    .name("idx_students_team_student")
                    .table(Students::Table)
                    .col(Students::TeamId)
                    .col(Students::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 创建评审记录表
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(Reviews::SessionId).big_integer().not_null())
                    .col(ColumnDef::new(Reviews::Attendance).text().not_null())
                    .col(ColumnDef::new(Reviews::Marks).text().not_null())
                    .col(ColumnDef::new(Reviews::Remarks).text().null())
                    .col(ColumnDef::new(Reviews::ReviewerId).string().not_null())
                    .col(ColumnDef::new(Reviews::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reviews::Table, Reviews::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reviews::Table, Reviews::SessionId)
                            .to(ReviewSessions::Table, ReviewSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个 (队伍, 场次) 至多一条评审：由数据库兜底并发竞争
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_team_session")
                    .table(Reviews::Table)
                    .col(Reviews::TeamId)
                    .col(Reviews::SessionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReviewSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationEvents::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum EvaluationEvents {
    Table,
    Id,
    Name,
    NumSessions,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ReviewSessions {
    Table,
    Id,
    EventId,
    SessionNumber,
    Criteria,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    TeamId,
    StudentId,
    Name,
    Details,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    TeamId,
    SessionId,
    Attendance,
    Marks,
    Remarks,
    ReviewerId,
    CreatedAt,
}
