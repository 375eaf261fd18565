//! 规则引擎领域模型
//!
//! 规则以数据（JSON 结构）表达：命名规则集按声明顺序评估，每条规则由
//! IF 条件表达式、THEN 动作表和可选的 OTHERWISE 动作表组成。

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 规则集：规则名 -> 规则，评估顺序即插入顺序
pub type RuleSet = IndexMap<String, Rule>;

/// 字段映射：路径键 -> 字段条件
pub type FieldMap = IndexMap<String, FieldCondition>;

/// 动作表：点号路径 -> 要写入的值
pub type ActionMap = IndexMap<String, Value>;

/// 规则定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// 条件表达式
    #[serde(rename = "IF")]
    pub condition: ConditionExpr,

    /// 条件为真时的动作表
    #[serde(rename = "THEN")]
    pub on_true: ActionMap,

    /// 条件为假时的动作表，缺省为空表
    #[serde(rename = "OTHERWISE", default, skip_serializing_if = "IndexMap::is_empty")]
    pub on_false: ActionMap,

    // TODO: 按权重排序规则的执行顺序。字段会被解析保存，但评估目前只按插入顺序。
    #[serde(rename = "WEIGHT", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Rule {
    pub fn new(condition: ConditionExpr, on_true: ActionMap) -> Self {
        Self {
            condition,
            on_true,
            on_false: ActionMap::new(),
            weight: None,
        }
    }
}

/// IF 条件表达式
///
/// 三种形态：`{AND: 字段映射}`、`{OR: 字段映射}`，或一个不含逻辑键的
/// 扁平字段映射（隐式 AND）。同时出现 AND 和 OR 的表达式语义未定义，
/// 在反序列化时直接拒绝。
#[derive(Debug, Clone)]
pub enum ConditionExpr {
    /// AND 组合
    All(FieldMap),
    /// OR 组合
    Any(FieldMap),
    /// 扁平映射，隐式 AND
    Flat(FieldMap),
}

impl ConditionExpr {
    /// 取内部字段映射
    pub fn fields(&self) -> &FieldMap {
        match self {
            Self::All(fields) | Self::Any(fields) | Self::Flat(fields) => fields,
        }
    }
}

impl Serialize for ConditionExpr {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::All(fields) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("AND", fields)?;
                map.end()
            }
            Self::Any(fields) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("OR", fields)?;
                map.end()
            }
            Self::Flat(fields) => fields.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ConditionExpr {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let has_and = raw.contains_key("AND");
        let has_or = raw.contains_key("OR");

        // 同时出现 AND 和 OR 的语义未定义，拒绝而不是猜测
        if has_and && has_or {
            return Err(de::Error::custom("IF 表达式不能同时包含 AND 和 OR"));
        }

        if raw.len() == 1 {
            if let Some(inner) = raw.get("AND") {
                return Ok(Self::All(field_map_from(inner.clone())?));
            }
            if let Some(inner) = raw.get("OR") {
                return Ok(Self::Any(field_map_from(inner.clone())?));
            }
        }

        let mut fields = FieldMap::with_capacity(raw.len());
        for (key, value) in raw {
            let condition = serde_json::from_value(value).map_err(de::Error::custom)?;
            fields.insert(key, condition);
        }
        Ok(Self::Flat(fields))
    }
}

fn field_map_from<E: de::Error>(value: Value) -> std::result::Result<FieldMap, E> {
    serde_json::from_value(value).map_err(E::custom)
}

/// 字段条件：要么是直接比较的原始值，要么是操作符对象
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FieldCondition {
    /// 操作符对象，所有出现的操作符按位与合并
    Operators(OperatorSpec),
    /// 原始值，表示"等于该值"
    Value(Value),
}

impl<'de> Deserialize<'de> for FieldCondition {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // 对象一律按操作符规格解析，其余类型都是相等比较的原始值
        let raw = Value::deserialize(deserializer)?;
        match raw {
            Value::Object(_) => serde_json::from_value(raw)
                .map(Self::Operators)
                .map_err(de::Error::custom),
            other => Ok(Self::Value(other)),
        }
    }
}

/// 操作符规格
///
/// 字段全部可选，未识别的键被忽略。多个操作符同时出现时全部评估并取与。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSpec {
    /// 开区间判定 (low, high)，两端都不包含
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub between: Option<[f64; 2]>,

    /// 子串 / 数组元素包含
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,

    /// 成员判定（与 `in` 同义）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<Value>>,

    /// 成员判定（与 `includes` 同义）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#in: Option<Vec<Value>>,

    /// 严格大于
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greater_than: Option<f64>,

    /// 严格小于
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_than: Option<f64>,

    /// 正则匹配（字符串中任意位置），内联标志如 `(?i)` 可用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,

    /// 取反条件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<NotCondition>,
}

/// 取反条件：排除列表或"不等于该字符串"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotCondition {
    /// `{in: [...]}` 或 `{includes: [...]}` 的否定成员判定
    Exclusion {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        r#in: Option<Vec<Value>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        includes: Option<Vec<Value>>,
    },
    /// 不等于该字符串
    Literal(String),
}

/// 引擎选项，构造后不可变
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// true 为严格相等（类型与值都一致），false 为宽松相等（允许类型强制转换）
    pub case_sensitive: bool,
    /// true 时把动作写回数据集并评估全部规则，false 时只评估第一条规则并返回动作表
    pub modify_dataset: bool,
}
