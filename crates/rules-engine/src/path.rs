//! 路径解析
//!
//! 把原始路径键解码为点号路径或显式路径段序列，并在嵌套对象中只读地
//! 取出对应的值。键本身含点号的字段（如 `person.name` 作为单个键）
//! 通过括号数组字面量寻址：`"['company', 'person.name']"`。

use serde_json::Value;

/// 解析后的路径键
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulePath {
    /// 点号路径或单个键
    Key(String),
    /// 显式路径段序列
    Segments(Vec<String>),
    /// 解析产物既不是字符串也不是数组，无法用于寻址
    Opaque,
}

impl RulePath {
    /// 解析原始路径键。
    ///
    /// 先把单引号改写为双引号再尝试按 JSON 解析：数组字面量产出路径段
    /// 序列，字符串字面量产出普通路径；解析失败时原样退回为点号路径。
    /// 解析失败是预期的回退路径，本函数永不报错。
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.replace('\'', "\"");
        match serde_json::from_str::<Value>(&normalized) {
            Ok(Value::Array(items)) => {
                let segments = items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        // 非字符串段按其 JSON 文本作键，与对象键的字符串化一致
                        other => other.to_string(),
                    })
                    .collect();
                Self::Segments(segments)
            }
            Ok(Value::String(s)) => Self::Key(s),
            Ok(_) => Self::Opaque,
            Err(_) => Self::Key(raw.to_string()),
        }
    }

    /// 在嵌套对象中读取路径对应的值。
    ///
    /// 逐段下钻：当前值不是对象或缺少下一段键时返回 None。
    /// 绝不创建中间键，也不做数组下标寻址。
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let map = root.as_object()?;
        match self {
            Self::Key(path) => {
                // 无点号的键直接命中
                if !path.contains('.') {
                    return map.get(path);
                }
                walk(root, path.split('.'))
            }
            Self::Segments(segments) => walk(root, segments.iter().map(String::as_str)),
            Self::Opaque => None,
        }
    }
}

fn walk<'a, I, S>(root: &'a Value, segments: I) -> Option<&'a Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut current = root;
    for segment in segments {
        current = current.as_object()?.get(segment.as_ref())?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_key() {
        let data = json!({ "x": 2 });
        let path = RulePath::parse("x");
        assert_eq!(path.resolve(&data), Some(&json!(2)));
    }

    #[test]
    fn test_nested_path() {
        let data = json!({ "a": { "b": "Hello", "c": "World" } });
        assert_eq!(RulePath::parse("a.b").resolve(&data), Some(&json!("Hello")));

        let data = json!({ "x": { "b": { "c": "3" } } });
        assert_eq!(RulePath::parse("x.b.c").resolve(&data), Some(&json!("3")));
    }

    #[test]
    fn test_deeply_nested_path() {
        let data = json!({ "x": { "b": 1, "w": { "a": { "w": 3 } } } });
        assert_eq!(RulePath::parse("x.w.a.w").resolve(&data), Some(&json!(3)));

        let data = json!({ "a": { "b": { "c": { "d": "Hello" } }, "e": "World" } });
        assert_eq!(
            RulePath::parse("a.b.c.d").resolve(&data),
            Some(&json!("Hello"))
        );
    }

    #[test]
    fn test_missing_path() {
        let data = json!({ "a": { "b": "Hello" } });
        assert_eq!(RulePath::parse("d.e").resolve(&data), None);
        assert_eq!(RulePath::parse("x.y.z").resolve(&data), None);
        assert_eq!(RulePath::parse("a.b.c").resolve(&data), None);
    }

    #[test]
    fn test_non_object_intermediate() {
        let data = json!({ "a": { "b": 5 } });
        assert_eq!(RulePath::parse("a.b.c").resolve(&data), None);
    }

    #[test]
    fn test_dotted_key_via_segments() {
        // 键名本身含点号，只能用段序列寻址
        let data = json!({ "a": { "hello.world": "Hello" } });
        let path = RulePath::parse("['a', 'hello.world']");
        assert_eq!(path, RulePath::Segments(vec!["a".into(), "hello.world".into()]));
        assert_eq!(path.resolve(&data), Some(&json!("Hello")));

        // 点号路径与段序列寻址的是不同的键
        let nested = json!({ "a": { "b": { "c": 1 } } });
        assert_eq!(RulePath::parse("a.b.c").resolve(&nested), Some(&json!(1)));
        assert_eq!(RulePath::parse("['a', 'b.c']").resolve(&nested), None);
    }

    #[test]
    fn test_malformed_bracket_falls_back_to_literal() {
        let path = RulePath::parse("['unterminated");
        assert_eq!(path, RulePath::Key("['unterminated".to_string()));

        // 字面键存在时按原样命中
        let data = json!({ "['unterminated": "ok" });
        assert_eq!(path.resolve(&data), Some(&json!("ok")));
    }

    #[test]
    fn test_opaque_path() {
        // 能按 JSON 解析但既非字符串也非数组的键无法寻址
        let data = json!({ "17": "value", "true": "value" });
        assert_eq!(RulePath::parse("17"), RulePath::Opaque);
        assert_eq!(RulePath::parse("17").resolve(&data), None);
        assert_eq!(RulePath::parse("true").resolve(&data), None);
    }

    #[test]
    fn test_quoted_string_key() {
        let data = json!({ "hello": "world" });
        assert_eq!(RulePath::parse("'hello'").resolve(&data), Some(&json!("world")));
    }

    #[test]
    fn test_numeric_segments_are_stringified() {
        let data = json!({ "a": { "1": "one" } });
        let path = RulePath::parse("['a', 1]");
        assert_eq!(path.resolve(&data), Some(&json!("one")));
    }

    #[test]
    fn test_non_object_root() {
        assert_eq!(RulePath::parse("a").resolve(&json!([1, 2])), None);
        assert_eq!(RulePath::parse("a").resolve(&json!("str")), None);
    }
}
