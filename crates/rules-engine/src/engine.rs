//! 规则引擎编排器
//!
//! 持有不可变的规则集与选项，按声明顺序评估规则并分发动作。

use crate::actions::ActionApplier;
use crate::error::Result;
use crate::evaluator::ConditionEvaluator;
use crate::models::{ActionMap, EngineOptions, RuleSet};
use serde_json::Value;
use tracing::{debug, instrument};

/// 规则引擎
///
/// 构造后规则集与选项都不可变，实例可在线程间共享，对不同数据集并发
/// 评估。引擎不保留任何跨调用状态。
#[derive(Debug, Clone)]
pub struct RulesEngine {
    rules: RuleSet,
    options: EngineOptions,
}

impl RulesEngine {
    /// 创建引擎实例
    pub fn new(rules: RuleSet, options: EngineOptions) -> Self {
        Self { rules, options }
    }

    /// 从 JSON 字符串加载规则集
    pub fn from_json(json: &str, options: EngineOptions) -> Result<Self> {
        let rules: RuleSet = serde_json::from_str(json)?;
        Ok(Self::new(rules, options))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// 运行规则集。
    ///
    /// 只读模式（modifyDataset=false）：只评估第一条规则，返回其胜出的
    /// 动作表，不触碰数据集。
    ///
    /// 修改模式（modifyDataset=true）：按声明顺序评估每条规则，把胜出的
    /// 动作表写回数据集后继续下一条，返回 `Ok(None)`。写入失败
    /// （中间路径段缺失）会中断本次运行并向上传播。
    ///
    /// 数据集不是对象时静默返回 `Ok(None)`。
    #[instrument(skip(self, dataset), fields(rule_count = self.rules.len()))]
    pub fn run(&self, dataset: &mut Value) -> Result<Option<&ActionMap>> {
        if !dataset.is_object() {
            return Ok(None);
        }

        for (name, rule) in &self.rules {
            let matched = ConditionEvaluator::evaluate(&rule.condition, dataset, &self.options);
            debug!(rule = %name, matched, "规则评估完成");

            let actions = if matched { &rule.on_true } else { &rule.on_false };
            if !self.options.modify_dataset {
                // 只读模式下只处理第一条规则
                return Ok(Some(actions));
            }
            ActionApplier::apply(actions, dataset)?;
        }

        Ok(None)
    }
}
