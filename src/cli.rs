use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 开放式题目评分标准与课程后台任务工具
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 解析评分标准并输出渲染数据
    RubricRender {
        /// 评分标准 XML 文件
        file: PathBuf,
    },
    /// 检查评分标准与题目满分是否一致
    RubricCheck {
        /// 评分标准 XML 文件
        file: PathBuf,
        /// 题目位置，用于错误信息
        location: String,
        /// 题目配置的满分
        expected_max_score: i64,
    },
    /// 查看任务记录
    TaskStatus {
        /// 任务记录 ID
        entry_id: i64,
    },
}
