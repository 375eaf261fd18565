//! 动作应用器
//!
//! 把动作表按点号路径写回数据集。条件评估（只读）与动作写入在结构上
//! 分离，数据集只在这里被改动。

use crate::error::{Result, RuleError};
use crate::models::ActionMap;
use serde_json::Value;

/// 动作应用器
pub struct ActionApplier;

impl ActionApplier {
    /// 将动作表逐项写入数据集。
    ///
    /// 路径的所有中间段必须已经解析为对象，否则返回
    /// `MutationTargetMissing`；末段赋值覆盖已有值。不创建中间对象。
    pub fn apply(actions: &ActionMap, dataset: &mut Value) -> Result<()> {
        for (path, value) in actions {
            Self::write(path, value, dataset)?;
        }
        Ok(())
    }

    fn write(path: &str, value: &Value, dataset: &mut Value) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(());
        };

        let mut current = dataset;
        for segment in parents {
            current = match current.get_mut(*segment) {
                Some(next) if next.is_object() => next,
                _ => {
                    return Err(RuleError::MutationTargetMissing {
                        path: path.to_string(),
                        segment: (*segment).to_string(),
                    });
                }
            };
        }

        match current {
            Value::Object(map) => {
                map.insert((*last).to_string(), value.clone());
                Ok(())
            }
            _ => Err(RuleError::MutationTargetMissing {
                path: path.to_string(),
                segment: (*last).to_string(),
            }),
        }
    }
}
