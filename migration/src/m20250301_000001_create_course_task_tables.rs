use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建学生模块状态表
        manager
            .create_table(
                Table::create()
                    .table(StudentModules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentModules::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StudentModules::CourseId).string().not_null())
                    .col(
                        ColumnDef::new(StudentModules::ModuleStateKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentModules::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudentModules::State).text().null())
                    .col(ColumnDef::new(StudentModules::Grade).double().null())
                    .col(ColumnDef::new(StudentModules::MaxGrade).double().null())
                    .col(
                        ColumnDef::new(StudentModules::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentModules::ModifiedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentModules::Table, StudentModules::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建课程后台任务表
        manager
            .create_table(
                Table::create()
                    .table(CourseTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseTasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseTasks::TaskType).string().not_null())
                    .col(ColumnDef::new(CourseTasks::CourseId).string().not_null())
                    .col(ColumnDef::new(CourseTasks::TaskKey).string().not_null())
                    .col(ColumnDef::new(CourseTasks::TaskInput).text().not_null())
                    .col(ColumnDef::new(CourseTasks::TaskId).string().null())
                    .col(ColumnDef::new(CourseTasks::TaskState).string().not_null())
                    .col(ColumnDef::new(CourseTasks::TaskOutput).text().null())
                    .col(ColumnDef::new(CourseTasks::RequesterId).big_integer().null())
                    .col(ColumnDef::new(CourseTasks::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(CourseTasks::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_student_modules_unique")
                    .table(StudentModules::Table)
                    .col(StudentModules::CourseId)
                    .col(StudentModules::ModuleStateKey)
                    .col(StudentModules::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_course_tasks_task_id")
                    .table(CourseTasks::Table)
                    .col(CourseTasks::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_course_tasks_course_key")
                    .table(CourseTasks::Table)
                    .col(CourseTasks::CourseId)
                    .col(CourseTasks::TaskKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(CourseTasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentModules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    DisplayName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StudentModules {
    #[sea_orm(iden = "student_modules")]
    Table,
    Id,
    CourseId,
    ModuleStateKey,
    StudentId,
    State,
    Grade,
    MaxGrade,
    CreatedAt,
    ModifiedAt,
}

#[derive(DeriveIden)]
enum CourseTasks {
    #[sea_orm(iden = "course_tasks")]
    Table,
    Id,
    TaskType,
    CourseId,
    TaskKey,
    TaskInput,
    TaskId,
    TaskState,
    TaskOutput,
    RequesterId,
    CreatedAt,
    UpdatedAt,
}
