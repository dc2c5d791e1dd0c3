use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentModule {
    // 唯一 ID
    pub id: i64,
    // 课程 ID
    pub course_id: String,
    // 题目位置
    pub module_state_key: String,
    // 学生 ID
    pub student_id: i64,
    // 序列化的作答状态（JSON）
    pub state: Option<String>,
    // 得分
    pub grade: Option<f64>,
    // 满分
    pub max_grade: Option<f64>,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 修改时间
    pub modified_at: chrono::DateTime<chrono::Utc>,
}

impl StudentModule {
    /// 解析作答状态，空状态视为空对象
    pub fn parsed_state(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match self.state.as_deref() {
            None => Ok(serde_json::Map::new()),
            Some(raw) if raw.trim().is_empty() => Ok(serde_json::Map::new()),
            Some(raw) => Ok(serde_json::from_str(raw)?),
        }
    }

    /// 已用作答次数
    pub fn attempts(&self) -> Result<Option<i64>> {
        Ok(self
            .parsed_state()?
            .get("attempts")
            .and_then(serde_json::Value::as_i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_with_state(state: Option<&str>) -> StudentModule {
        StudentModule {
            id: 1,
            course_id: "course".to_string(),
            module_state_key: "problem".to_string(),
            student_id: 1,
            state: state.map(str::to_string),
            grade: None,
            max_grade: None,
            created_at: chrono::Utc::now(),
            modified_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_attempts_from_state() {
        let module = module_with_state(Some(r#"{"attempts": 3, "done": true}"#));
        assert_eq!(module.attempts().unwrap(), Some(3));
    }

    #[test]
    fn test_attempts_missing() {
        assert_eq!(module_with_state(None).attempts().unwrap(), None);
        assert_eq!(module_with_state(Some("{}")).attempts().unwrap(), None);
    }

    #[test]
    fn test_invalid_state_is_error() {
        assert!(module_with_state(Some("not json")).attempts().is_err());
    }
}
