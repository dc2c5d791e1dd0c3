//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - variant_name() 方法 - 返回变体名称（写入任务失败记录）
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_course_task_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum CourseTaskError {
            $($variant(String),)*
        }

        impl CourseTaskError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(CourseTaskError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(CourseTaskError::$variant(_) => $type_name,)*
                }
            }

            /// 获取变体名称
            pub fn variant_name(&self) -> &'static str {
                match self {
                    $(CourseTaskError::$variant(_) => stringify!($variant),)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(CourseTaskError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl CourseTaskError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        CourseTaskError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_course_task_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    FileOperation("E004", "File Operation Error"),
    Validation("E005", "Validation Error"),
    NotFound("E006", "Resource Not Found"),
    Serialization("E007", "Serialization Error"),
    RubricParsing("E008", "Rubric Parsing Error"),
    RubricConfiguration("E009", "Rubric Configuration Error"),
    UpdateProblemModuleState("E010", "Update Problem Module State Error"),
    ModuleStore("E011", "Module Store Error"),
    ModuleSystem("E012", "Module System Error"),
    Template("E013", "Template Rendering Error"),
}

impl CourseTaskError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为评分标准的配置错误（不会被统一包装为解析错误）
    pub fn is_rubric_configuration(&self) -> bool {
        matches!(self, CourseTaskError::RubricConfiguration(_))
    }
}

impl fmt::Display for CourseTaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CourseTaskError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for CourseTaskError {
    fn from(err: sea_orm::DbErr) -> Self {
        CourseTaskError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for CourseTaskError {
    fn from(err: std::io::Error) -> Self {
        CourseTaskError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for CourseTaskError {
    fn from(err: serde_json::Error) -> Self {
        CourseTaskError::Serialization(err.to_string())
    }
}

impl From<xml::reader::Error> for CourseTaskError {
    fn from(err: xml::reader::Error) -> Self {
        CourseTaskError::RubricParsing(format!("invalid rubric xml: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, CourseTaskError>;
