/// 学生模块状态过滤条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStateFilter {
    /// 仅保留作答状态标记为完成（`"done": true`）的记录
    Done,
}

impl ModuleStateFilter {
    /// 状态 JSON 中需要包含的片段（任一匹配即可）
    pub fn state_fragments(&self) -> &'static [&'static str] {
        match self {
            ModuleStateFilter::Done => &[r#""done": true"#, r#""done":true"#],
        }
    }

    pub fn matches(&self, state: Option<&str>) -> bool {
        state.is_some_and(|s| self.state_fragments().iter().any(|f| s.contains(f)))
    }
}

/// 学生模块查询条件
#[derive(Debug, Clone, PartialEq)]
pub struct StudentModuleQuery {
    pub course_id: String,
    pub module_state_key: String,
    pub student_id: Option<i64>,
    pub state_filter: Option<ModuleStateFilter>,
}

impl StudentModuleQuery {
    pub fn new(course_id: impl Into<String>, module_state_key: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            module_state_key: module_state_key.into(),
            student_id: None,
            state_filter: None,
        }
    }

    pub fn with_student(mut self, student_id: Option<i64>) -> Self {
        self.student_id = student_id;
        self
    }

    pub fn with_state_filter(mut self, filter: Option<ModuleStateFilter>) -> Self {
        self.state_filter = filter;
        self
    }
}

/// 创建学生模块请求
#[derive(Debug, Clone)]
pub struct CreateStudentModuleRequest {
    pub course_id: String,
    pub module_state_key: String,
    pub student_id: i64,
    pub state: Option<String>,
    pub grade: Option<f64>,
    pub max_grade: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_filter() {
        let filter = ModuleStateFilter::Done;
        assert!(filter.matches(Some(r#"{"attempts": 1, "done": true}"#)));
        assert!(filter.matches(Some(r#"{"done":true}"#)));
        assert!(!filter.matches(Some(r#"{"done": false}"#)));
        assert!(!filter.matches(None));
    }
}
