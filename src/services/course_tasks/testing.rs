//! 测试用的假协作方和数据准备

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value, json};

use super::CourseTaskService;
use super::courseware::{
    ModuleDescriptor, ModuleInstanceRequest, ModuleStore, ModuleSystem, ProblemModule,
};
use super::tracking::{TaskInfo, TrackFunction, Tracker};
use super::progress::ProgressReporter;
use crate::errors::{CourseTaskError, Result};
use crate::models::course_tasks::{
    entities::{CourseTask, CourseTaskType},
    requests::{CreateCourseTaskRequest, TaskInput},
    responses::TaskProgress,
};
use crate::models::student_modules::{
    entities::StudentModule,
    requests::{CreateStudentModuleRequest, StudentModuleQuery},
};
use crate::models::users::{entities::User, requests::CreateUserRequest};
use crate::storage::{Storage, memory_storage::MemoryStorage};

pub struct FakeModuleStore;

#[async_trait::async_trait]
impl ModuleStore for FakeModuleStore {
    async fn get_instance(&self, course_id: &str, location: &str) -> Result<ModuleDescriptor> {
        if course_id == Fixture::COURSE && location == Fixture::PROBLEM {
            Ok(ModuleDescriptor::new(location, "problem"))
        } else {
            Err(CourseTaskError::module_store(format!(
                "{location} not found in {course_id}"
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleBehavior {
    Rescorable,
    NotRescorable,
    Denied,
}

pub struct FakeModuleSystem {
    behavior: Mutex<ModuleBehavior>,
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeModuleSystem {
    fn new() -> Self {
        Self {
            behavior: Mutex::new(ModuleBehavior::Rescorable),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behavior(&self, behavior: ModuleBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// 指定某个学生的重新评分结果，默认为 `{"success": "correct"}`
    pub fn set_response(&self, username: &str, response: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(username.to_string(), response);
    }

    /// 已创建实例的 (学生, 评分分桶)
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ModuleSystem for FakeModuleSystem {
    async fn get_module_for_descriptor(
        &self,
        request: ModuleInstanceRequest<'_>,
    ) -> Result<Option<Box<dyn ProblemModule>>> {
        let username = request.student.username.clone();
        self.calls.lock().unwrap().push((
            username.clone(),
            request.grade_bucket_type.map(str::to_string),
        ));

        let behavior = *self.behavior.lock().unwrap();
        if behavior == ModuleBehavior::Denied {
            return Ok(None);
        }
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&username)
            .cloned()
            .unwrap_or_else(|| json!({ "success": "correct" }));
        let response = match response {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(Some(Box::new(FakeProblem {
            rescorable: behavior == ModuleBehavior::Rescorable,
            response,
            track: request.track_function,
        })))
    }
}

struct FakeProblem {
    rescorable: bool,
    response: Map<String, Value>,
    track: TrackFunction,
}

#[async_trait::async_trait]
impl ProblemModule for FakeProblem {
    fn supports_rescoring(&self) -> bool {
        self.rescorable
    }

    async fn rescore_problem(&mut self) -> Result<Map<String, Value>> {
        (self.track)("problem_rescore", Value::Object(self.response.clone()));
        Ok(self.response.clone())
    }
}

#[derive(Debug, Clone)]
pub struct TrackedEvent {
    pub request_info: Map<String, Value>,
    pub student: String,
    pub task_id: String,
    pub event_type: String,
    pub event: Value,
    pub page: String,
}

#[derive(Default)]
pub struct RecordingTracker(Mutex<Vec<TrackedEvent>>);

impl RecordingTracker {
    pub fn events(&self) -> Vec<TrackedEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl Tracker for RecordingTracker {
    fn track(
        &self,
        request_info: &Map<String, Value>,
        task_info: &TaskInfo,
        event_type: &str,
        event: Value,
        page: &str,
    ) {
        self.0.lock().unwrap().push(TrackedEvent {
            request_info: request_info.clone(),
            student: task_info.student.clone(),
            task_id: task_info.task_id.clone(),
            event_type: event_type.to_string(),
            event,
            page: page.to_string(),
        });
    }
}

#[derive(Default)]
pub struct RecordingProgress(Mutex<Vec<TaskProgress>>);

impl RecordingProgress {
    pub fn snapshots(&self) -> Vec<TaskProgress> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, _task_id: &str, progress: &TaskProgress) {
        self.0.lock().unwrap().push(progress.clone());
    }
}

pub struct Fixture {
    pub storage: Arc<MemoryStorage>,
    pub module_system: Arc<FakeModuleSystem>,
    pub tracker: Arc<RecordingTracker>,
    pub service: CourseTaskService,
    pub students: Vec<User>,
}

impl Fixture {
    pub const COURSE: &'static str = "MITx/6.002x/2013_Spring";
    pub const PROBLEM: &'static str = "i4x://MITx/6.002x/problem/circuit";

    pub async fn empty() -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let module_system = Arc::new(FakeModuleSystem::new());
        let tracker = Arc::new(RecordingTracker::default());
        let service = CourseTaskService::new(
            storage.clone(),
            Arc::new(FakeModuleStore),
            module_system.clone(),
        )
        .with_tracker(tracker.clone())
        .with_traceback_limit(700);

        Self {
            storage,
            module_system,
            tracker,
            service,
            students: Vec::new(),
        }
    }

    /// 创建 `count` 个学生（student0, student1, ...），每人一条已提交的作答记录
    pub async fn with_students(count: usize) -> Self {
        let mut fixture = Self::empty().await;
        for i in 0..count {
            let student = fixture.add_student(&format!("student{i}")).await;
            let state = format!(r#"{{"attempts": {}, "done": true}}"#, i + 1);
            fixture.add_module(&student, Some(&state)).await;
            fixture.students.push(student);
        }
        fixture
    }

    pub async fn add_student(&self, username: &str) -> User {
        self.storage
            .create_user(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                display_name: None,
            })
            .await
            .unwrap()
    }

    pub async fn add_module(&self, student: &User, state: Option<&str>) -> StudentModule {
        self.add_module_for(student, Self::PROBLEM, state).await
    }

    pub async fn add_module_for(
        &self,
        student: &User,
        problem: &str,
        state: Option<&str>,
    ) -> StudentModule {
        self.storage
            .create_student_module(CreateStudentModuleRequest {
                course_id: Self::COURSE.to_string(),
                module_state_key: problem.to_string(),
                student_id: student.id,
                state: state.map(str::to_string),
                grade: None,
                max_grade: None,
            })
            .await
            .unwrap()
    }

    pub async fn entry(&self, task_type: CourseTaskType) -> CourseTask {
        self.storage
            .create_course_task(CreateCourseTaskRequest {
                task_type,
                course_id: Self::COURSE.to_string(),
                task_key: Self::PROBLEM.to_string(),
                task_input: TaskInput::for_problem(Self::PROBLEM),
                requester_id: None,
            })
            .await
            .unwrap()
    }

    pub async fn stored_entry(&self, id: i64) -> CourseTask {
        self.storage.get_course_task_by_id(id).await.unwrap().unwrap()
    }

    pub async fn stored_module(&self, id: i64) -> StudentModule {
        self.storage
            .get_student_module_by_id(id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn module_count(&self) -> u64 {
        self.storage
            .count_student_modules(&StudentModuleQuery::new(Self::COURSE, Self::PROBLEM))
            .await
            .unwrap()
    }
}
