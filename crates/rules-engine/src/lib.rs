//! 声明式规则引擎
//!
//! 条件以数据（JSON 结构）而非代码表达，支持：
//! - 点号路径与括号数组字面量寻址嵌套字段
//! - 字段操作符库（相等、区间、成员、子串、正则、取反）
//! - AND/OR 逻辑组合，逐字段累加、不短路
//! - 动作表写回数据集（modifyDataset 模式）
//!
//! 非显性契约：OR 组中的普通值字段按"不等"参与累加，与 AND 组的
//! "相等"相反；`caseSensitive` 控制的是宽松/严格相等而非大小写。
//! 两者都是规则格式的既定行为。

pub mod actions;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod path;

pub use actions::ActionApplier;
pub use engine::RulesEngine;
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use models::{
    ActionMap, ConditionExpr, EngineOptions, FieldCondition, FieldMap, NotCondition, OperatorSpec,
    Rule, RuleSet,
};
pub use path::RulePath;
