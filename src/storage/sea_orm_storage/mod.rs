//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod course_tasks;
mod student_modules;
mod users;

use crate::config::AppConfig;
use crate::errors::{CourseTaskError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| CourseTaskError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL 模式，启用外键）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| CourseTaskError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        // 任务逐条提交写入，连接数不宜过多
        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .connect_with(opt)
            .await
            .map_err(|e| CourseTaskError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| CourseTaskError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型，裸文件路径按 SQLite 处理
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(CourseTaskError::database_config(format!(
                "无法识别的数据库 URL: {url}（支持 sqlite://、postgres://、mysql://、memory:// 或 .db 文件路径）"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    course_tasks::{entities::CourseTask, requests::CreateCourseTaskRequest},
    student_modules::{
        entities::StudentModule,
        requests::{CreateStudentModuleRequest, StudentModuleQuery},
    },
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    // 学生模块状态
    async fn create_student_module(
        &self,
        req: CreateStudentModuleRequest,
    ) -> Result<StudentModule> {
        self.create_student_module_impl(req).await
    }

    async fn get_student_module_by_id(&self, id: i64) -> Result<Option<StudentModule>> {
        self.get_student_module_by_id_impl(id).await
    }

    async fn count_student_modules(&self, query: &StudentModuleQuery) -> Result<u64> {
        self.count_student_modules_impl(query).await
    }

    async fn list_student_modules(&self, query: &StudentModuleQuery) -> Result<Vec<StudentModule>> {
        self.list_student_modules_impl(query).await
    }

    async fn update_student_module_state(&self, id: i64, state: &str) -> Result<bool> {
        self.update_student_module_state_impl(id, state).await
    }

    async fn delete_student_module(&self, id: i64) -> Result<bool> {
        self.delete_student_module_impl(id).await
    }

    // 课程后台任务
    async fn create_course_task(&self, req: CreateCourseTaskRequest) -> Result<CourseTask> {
        self.create_course_task_impl(req).await
    }

    async fn get_course_task_by_id(&self, id: i64) -> Result<Option<CourseTask>> {
        self.get_course_task_by_id_impl(id).await
    }

    async fn update_course_task(&self, task: &CourseTask) -> Result<CourseTask> {
        self.update_course_task_impl(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("coursetask.db").unwrap(),
            "sqlite://coursetask.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://localhost/lms").unwrap(),
            "postgres://localhost/lms"
        );
        let err = SeaOrmStorage::build_database_url("ftp://example.com").unwrap_err();
        assert_eq!(err.variant_name(), "DatabaseConfig");
    }
}
