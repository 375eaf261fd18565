//! 条件评估器
//!
//! 实现字段操作符库与 AND/OR 逻辑组合。按位逐字段累加，所有字段都会被
//! 评估，不做短路求值。
//!
//! 非显性契约：OR 组里的普通值字段按"不等"参与累加，与 AND 组的"相等"
//! 相反。这是规则格式的既定行为，下游依赖它，不要按直觉对齐成相等判定。

use crate::models::{ConditionExpr, EngineOptions, FieldCondition, FieldMap, NotCondition, OperatorSpec};
use crate::path::RulePath;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

#[derive(Clone, Copy, PartialEq, Eq)]
enum LogicMode {
    And,
    Or,
}

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估整条 IF 表达式
    ///
    /// 扁平映射按隐式 AND 处理。空字段映射恒为假（空洞假，而非空洞真）。
    pub fn evaluate(expr: &ConditionExpr, dataset: &Value, options: &EngineOptions) -> bool {
        match expr {
            ConditionExpr::All(fields) | ConditionExpr::Flat(fields) => {
                Self::combine(fields, dataset, options, LogicMode::And)
            }
            ConditionExpr::Any(fields) => Self::combine(fields, dataset, options, LogicMode::Or),
        }
    }

    fn combine(
        fields: &FieldMap,
        dataset: &Value,
        options: &EngineOptions,
        mode: LogicMode,
    ) -> bool {
        if fields.is_empty() {
            return false;
        }

        let mut acc = mode == LogicMode::And;
        for (raw_key, condition) in fields {
            let path = RulePath::parse(raw_key);
            let field_value = path.resolve(dataset);

            let field_result = match condition {
                FieldCondition::Operators(spec) => Self::operators(spec, field_value),
                FieldCondition::Value(expected) => {
                    let equal = Self::values_equal(expected, field_value, options);
                    match mode {
                        LogicMode::And => equal,
                        // OR 组按不等判定（见模块文档）
                        LogicMode::Or => !equal,
                    }
                }
            };

            match mode {
                LogicMode::And => acc &= field_result,
                LogicMode::Or => acc |= field_result,
            }
        }
        acc
    }

    /// 评估操作符对象：所有出现的操作符按位与合并。
    ///
    /// 兼容性约定：`greaterThan: 0`、`lessThan: 0`、空字符串的 `contains`/
    /// `matches`/`not` 视为未指定该操作符，直接跳过。
    fn operators(spec: &OperatorSpec, value: Option<&Value>) -> bool {
        let mut result = true;

        if let Some(bounds) = &spec.between {
            result &= Self::between(bounds, value);
        }
        if let Some(needle) = &spec.contains {
            if !needle.is_empty() {
                result &= Self::contains(needle, value);
            }
        }
        if let Some(limit) = spec.greater_than {
            if limit != 0.0 {
                result &= Self::greater_than(limit, value);
            }
        }
        if let Some(limit) = spec.less_than {
            if limit != 0.0 {
                result &= Self::less_than(limit, value);
            }
        }
        if let Some(list) = &spec.r#in {
            result &= Self::includes(list, value);
        }
        if let Some(list) = &spec.includes {
            result &= Self::includes(list, value);
        }
        if let Some(pattern) = &spec.matches {
            if !pattern.is_empty() {
                result &= Self::matches(pattern, value);
            }
        }
        if let Some(not) = &spec.not {
            let skipped = matches!(not, NotCondition::Literal(s) if s.is_empty());
            if !skipped {
                result &= Self::not(not, value);
            }
        }

        result
    }

    /// between：开区间判定，两端都不包含
    fn between(bounds: &[f64; 2], value: Option<&Value>) -> bool {
        match value.and_then(Value::as_f64) {
            Some(v) => bounds[0] < v && v < bounds[1],
            None => false,
        }
    }

    /// contains：字符串含子串，或数组含该字符串元素
    fn contains(needle: &str, value: Option<&Value>) -> bool {
        match value {
            Some(Value::String(s)) => s.contains(needle),
            Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(needle)),
            _ => false,
        }
    }

    /// includes / in：字段值必须是字符串且出现在列表里。
    /// 数值字段值不参与匹配。
    fn includes(list: &[Value], value: Option<&Value>) -> bool {
        match value {
            Some(Value::String(s)) => list.iter().any(|item| item.as_str() == Some(s.as_str())),
            _ => false,
        }
    }

    fn greater_than(limit: f64, value: Option<&Value>) -> bool {
        value.and_then(Value::as_f64).is_some_and(|v| v > limit)
    }

    fn less_than(limit: f64, value: Option<&Value>) -> bool {
        value.and_then(Value::as_f64).is_some_and(|v| v < limit)
    }

    /// matches：正则在字符串任意位置命中
    fn matches(pattern: &str, value: Option<&Value>) -> bool {
        let Some(s) = value.and_then(Value::as_str) else {
            return false;
        };
        match Regex::new(pattern) {
            Ok(regex) => regex.is_match(s),
            Err(e) => {
                warn!("无效的正则表达式 '{}': {}", pattern, e);
                false
            }
        }
    }

    /// not：排除列表取否定成员判定，字符串取不等判定
    fn not(condition: &NotCondition, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        if value.is_null() {
            return false;
        }

        match condition {
            NotCondition::Exclusion { r#in, includes } => {
                if let Some(list) = r#in {
                    !Self::includes(list, Some(value))
                } else if let Some(list) = includes {
                    !Self::includes(list, Some(value))
                } else {
                    false
                }
            }
            NotCondition::Literal(expected) => match value {
                Value::String(s) => s != expected,
                _ => false,
            },
        }
    }

    /// 普通值比较：caseSensitive 选择严格或宽松相等
    fn values_equal(expected: &Value, value: Option<&Value>, options: &EngineOptions) -> bool {
        if options.case_sensitive {
            Self::strict_eq(expected, value)
        } else {
            Self::loose_eq(expected, value)
        }
    }

    /// 严格相等：类型与值都必须一致。数字只有一种类型，统一按 f64 比较。
    fn strict_eq(expected: &Value, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        if let (Value::Number(a), Value::Number(b)) = (expected, value) {
            return match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
                _ => false,
            };
        }
        expected == value
    }

    /// 宽松相等：允许类型强制转换。
    ///
    /// 数字字符串可等于数字，布尔按 0/1 参与数值比较，缺失字段等于 null。
    /// 数组和对象不参与强制转换，一律不等。
    fn loose_eq(expected: &Value, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            // 缺失字段只宽松等于 null
            return expected.is_null();
        };
        Self::loose_eq_values(expected, value)
    }

    fn loose_eq_values(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            // 字符串对字符串直接比较，"1" 与 "01" 不相等
            (Value::String(x), Value::String(y)) => x == y,
            _ => match (Self::coerce_number(a), Self::coerce_number(b)) {
                (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
                _ => false,
            },
        }
    }

    /// 数值强制转换：数字原样，布尔转 0/1，字符串按数字解析（空白串转 0）
    fn coerce_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse().ok()
                }
            }
            _ => None,
        }
    }
}
