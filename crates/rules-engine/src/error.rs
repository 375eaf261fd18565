//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则集解析失败: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("动作路径 '{path}' 的段 '{segment}' 不是对象，无法写入")]
    MutationTargetMissing { path: String, segment: String },
}

pub type Result<T> = std::result::Result<T, RuleError>;
