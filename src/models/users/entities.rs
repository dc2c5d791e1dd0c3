use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    // 唯一 ID
    pub id: i64,
    // 用户名
    pub username: String,
    // 邮箱
    pub email: String,
    // 显示名称
    pub display_name: Option<String>,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 学生标识：用户名或邮箱
#[derive(Debug, Clone, PartialEq)]
pub enum StudentIdentifier {
    Username(String),
    Email(String),
}

impl StudentIdentifier {
    /// 含有 `@` 的标识按邮箱解析，否则按用户名解析
    pub fn parse(identifier: &str) -> Self {
        if identifier.contains('@') {
            StudentIdentifier::Email(identifier.to_string())
        } else {
            StudentIdentifier::Username(identifier.to_string())
        }
    }
}

impl std::fmt::Display for StudentIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudentIdentifier::Username(name) => write!(f, "username '{name}'"),
            StudentIdentifier::Email(email) => write!(f, "email '{email}'"),
        }
    }
}
