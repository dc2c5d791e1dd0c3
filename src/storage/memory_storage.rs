//! 内存存储后端
//!
//! `database.url` 以 `memory://` 开头时使用，主要用于测试和命令行试运行，
//! 进程退出后数据丢失。

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use super::Storage;
use crate::errors::{CourseTaskError, Result};
use crate::models::{
    course_tasks::{
        entities::{CourseTask, TaskState},
        requests::CreateCourseTaskRequest,
    },
    student_modules::{
        entities::StudentModule,
        requests::{CreateStudentModuleRequest, StudentModuleQuery},
    },
    users::{entities::User, requests::CreateUserRequest},
};

pub struct MemoryStorage {
    users: DashMap<i64, User>,
    student_modules: DashMap<i64, StudentModule>,
    course_tasks: DashMap<i64, CourseTask>,
    next_id: AtomicI64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            student_modules: DashMap::new(),
            course_tasks: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn matches(module: &StudentModule, query: &StudentModuleQuery) -> bool {
        module.course_id == query.course_id
            && module.module_state_key == query.module_state_key
            && query.student_id.is_none_or(|id| module.student_id == id)
            && query
                .state_filter
                .is_none_or(|filter| filter.matches(module.state.as_deref()))
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn create_user(&self, req: CreateUserRequest) -> Result<User> {
        let duplicated = self
            .users
            .iter()
            .any(|u| u.username == req.username || u.email == req.email);
        if duplicated {
            return Err(CourseTaskError::validation(format!(
                "用户名或邮箱已存在: {} / {}",
                req.username, req.email
            )));
        }

        let user = User {
            id: self.next_id(),
            username: req.username,
            email: req.email,
            display_name: req.display_name,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn create_student_module(
        &self,
        req: CreateStudentModuleRequest,
    ) -> Result<StudentModule> {
        let duplicated = self.student_modules.iter().any(|m| {
            m.course_id == req.course_id
                && m.module_state_key == req.module_state_key
                && m.student_id == req.student_id
        });
        if duplicated {
            return Err(CourseTaskError::validation(format!(
                "学生 {} 在 {} 上的状态已存在",
                req.student_id, req.module_state_key
            )));
        }

        let now = Utc::now();
        let module = StudentModule {
            id: self.next_id(),
            course_id: req.course_id,
            module_state_key: req.module_state_key,
            student_id: req.student_id,
            state: req.state,
            grade: req.grade,
            max_grade: req.max_grade,
            created_at: now,
            modified_at: now,
        };
        self.student_modules.insert(module.id, module.clone());
        Ok(module)
    }

    async fn get_student_module_by_id(&self, id: i64) -> Result<Option<StudentModule>> {
        Ok(self.student_modules.get(&id).map(|m| m.value().clone()))
    }

    async fn count_student_modules(&self, query: &StudentModuleQuery) -> Result<u64> {
        Ok(self
            .student_modules
            .iter()
            .filter(|m| Self::matches(m, query))
            .count() as u64)
    }

    async fn list_student_modules(&self, query: &StudentModuleQuery) -> Result<Vec<StudentModule>> {
        let mut modules: Vec<StudentModule> = self
            .student_modules
            .iter()
            .filter(|m| Self::matches(m, query))
            .map(|m| m.value().clone())
            .collect();
        modules.sort_by_key(|m| m.id);
        Ok(modules)
    }

    async fn update_student_module_state(&self, id: i64, state: &str) -> Result<bool> {
        match self.student_modules.get_mut(&id) {
            Some(mut module) => {
                module.state = Some(state.to_string());
                module.modified_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_student_module(&self, id: i64) -> Result<bool> {
        Ok(self.student_modules.remove(&id).is_some())
    }

    async fn create_course_task(&self, req: CreateCourseTaskRequest) -> Result<CourseTask> {
        let now = Utc::now();
        let task = CourseTask {
            id: self.next_id(),
            task_type: req.task_type,
            course_id: req.course_id,
            task_key: req.task_key,
            task_input: serde_json::to_string(&req.task_input)?,
            task_id: None,
            task_state: TaskState::Pending,
            task_output: None,
            requester_id: req.requester_id,
            created_at: now,
            updated_at: now,
        };
        self.course_tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_course_task_by_id(&self, id: i64) -> Result<Option<CourseTask>> {
        Ok(self.course_tasks.get(&id).map(|t| t.value().clone()))
    }

    async fn update_course_task(&self, task: &CourseTask) -> Result<CourseTask> {
        let Some(mut stored) = self.course_tasks.get_mut(&task.id) else {
            return Err(CourseTaskError::not_found(format!(
                "任务记录 {} 不存在",
                task.id
            )));
        };
        stored.task_id = task.task_id.clone();
        stored.task_state = task.task_state;
        stored.task_output = task.task_output.clone();
        stored.updated_at = Utc::now();
        Ok(stored.value().clone())
    }
}
