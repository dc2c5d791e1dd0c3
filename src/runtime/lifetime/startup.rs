use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::services::rubrics::{JsonRubricRenderer, RubricEngine};
use crate::storage::Storage;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 创建评分标准引擎，渲染器使用 JSON 输出
pub fn prepare_rubric_engine() -> RubricEngine {
    let engine = RubricEngine::from_config(Arc::new(JsonRubricRenderer));
    debug!(
        "Rubric engine ready (view_only: {}, max_score_allowed: {})",
        engine.view_only(),
        engine.max_score_allowed()
    );
    engine
}

/// 准备任务相关命令所需的上下文（存储后端）
pub async fn prepare_worker_startup() -> Result<StartupContext> {
    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    Ok(StartupContext { storage })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubric_engine_uses_config() {
        let engine = prepare_rubric_engine();
        let config = crate::config::AppConfig::get();
        assert_eq!(engine.max_score_allowed(), config.rubric.max_score_allowed);
        assert_eq!(engine.view_only(), config.rubric.view_only);
    }
}
