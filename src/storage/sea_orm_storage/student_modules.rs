//! 学生模块状态存储操作

use super::SeaOrmStorage;
use crate::entity::student_modules::{ActiveModel, Column, Entity as StudentModules};
use crate::errors::{CourseTaskError, Result};
use crate::models::student_modules::{
    entities::StudentModule,
    requests::{CreateStudentModuleRequest, StudentModuleQuery},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 根据查询条件构建查询
    fn student_module_select(query: &StudentModuleQuery) -> Select<StudentModules> {
        let mut select = StudentModules::find()
            .filter(Column::CourseId.eq(query.course_id.as_str()))
            .filter(Column::ModuleStateKey.eq(query.module_state_key.as_str()));

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        if let Some(filter) = query.state_filter {
            let condition = filter
                .state_fragments()
                .iter()
                .fold(Condition::any(), |condition, fragment| {
                    condition.add(Column::State.contains(*fragment))
                });
            select = select.filter(condition);
        }

        select
    }

    /// 创建学生模块状态
    pub async fn create_student_module_impl(
        &self,
        req: CreateStudentModuleRequest,
    ) -> Result<StudentModule> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            module_state_key: Set(req.module_state_key),
            student_id: Set(req.student_id),
            state: Set(req.state),
            grade: Set(req.grade),
            max_grade: Set(req.max_grade),
            created_at: Set(now),
            modified_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            CourseTaskError::database_operation(format!("创建学生模块状态失败: {e}"))
        })?;

        Ok(result.into_student_module())
    }

    /// 通过 ID 获取学生模块状态
    pub async fn get_student_module_by_id_impl(&self, id: i64) -> Result<Option<StudentModule>> {
        let result = StudentModules::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| {
                CourseTaskError::database_operation(format!("查询学生模块状态失败: {e}"))
            })?;

        Ok(result.map(|m| m.into_student_module()))
    }

    /// 统计学生模块状态
    pub async fn count_student_modules_impl(&self, query: &StudentModuleQuery) -> Result<u64> {
        Self::student_module_select(query)
            .count(&self.db)
            .await
            .map_err(|e| {
                CourseTaskError::database_operation(format!("统计学生模块状态失败: {e}"))
            })
    }

    /// 列出学生模块状态
    pub async fn list_student_modules_impl(
        &self,
        query: &StudentModuleQuery,
    ) -> Result<Vec<StudentModule>> {
        let results = Self::student_module_select(query)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                CourseTaskError::database_operation(format!("查询学生模块状态列表失败: {e}"))
            })?;

        Ok(results.into_iter().map(|m| m.into_student_module()).collect())
    }

    /// 更新作答状态，单条记录单独提交
    pub async fn update_student_module_state_impl(&self, id: i64, state: &str) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CourseTaskError::database_operation(format!("开启事务失败: {e}")))?;

        let result = StudentModules::update_many()
            .col_expr(
                Column::State,
                sea_orm::sea_query::Expr::value(state.to_string()),
            )
            .col_expr(
                Column::ModifiedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| {
                CourseTaskError::database_operation(format!("更新学生模块状态失败: {e}"))
            })?;

        txn.commit()
            .await
            .map_err(|e| CourseTaskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除学生模块状态，单条记录单独提交
    pub async fn delete_student_module_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CourseTaskError::database_operation(format!("开启事务失败: {e}")))?;

        let result = StudentModules::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| {
                CourseTaskError::database_operation(format!("删除学生模块状态失败: {e}"))
            })?;

        txn.commit()
            .await
            .map_err(|e| CourseTaskError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
