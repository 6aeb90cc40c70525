// ==========================================
// 配方成本管理系统 - 可空字段补丁
// ==========================================
// 用途: 区分 "未提及" / "设为新值" / "显式清空"
// 反序列化: 字段缺省 → Keep, null → Clear, 有值 → Set
// 使用: 字段需加 #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
// ==========================================

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 可空字段的部分更新指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// 保持原值
    Keep,
    /// 设置为新值
    Set(T),
    /// 清空为 None
    Clear,
}

impl<T> Default for FieldPatch<T> {
    fn default() -> Self {
        FieldPatch::Keep
    }
}

impl<T> FieldPatch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldPatch::Keep)
    }

    /// 新值的引用（仅 Set 时有值，用于校验）
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldPatch::Set(v) => Some(v),
            _ => None,
        }
    }

    /// 将补丁应用到目标字段
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            FieldPatch::Keep => {}
            FieldPatch::Set(v) => *target = Some(v),
            FieldPatch::Clear => *target = None,
        }
    }
}

impl<T> From<T> for FieldPatch<T> {
    fn from(value: T) -> Self {
        FieldPatch::Set(value)
    }
}

impl<'de, T> Deserialize<'de> for FieldPatch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => FieldPatch::Set(v),
            None => FieldPatch::Clear,
        })
    }
}

impl<T> Serialize for FieldPatch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldPatch::Set(v) => serializer.serialize_some(v),
            FieldPatch::Keep | FieldPatch::Clear => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Probe {
        #[serde(default)]
        note: FieldPatch<String>,
    }

    #[test]
    fn test_absent_null_and_value() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.note, FieldPatch::Keep);

        let cleared: Probe = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(cleared.note, FieldPatch::Clear);

        let set: Probe = serde_json::from_str(r#"{"note": "x"}"#).unwrap();
        assert_eq!(set.note, FieldPatch::Set("x".to_string()));
    }

    #[test]
    fn test_apply() {
        let mut target = Some("old".to_string());
        FieldPatch::Keep.apply(&mut target);
        assert_eq!(target.as_deref(), Some("old"));

        FieldPatch::Set("new".to_string()).apply(&mut target);
        assert_eq!(target.as_deref(), Some("new"));

        FieldPatch::<String>::Clear.apply(&mut target);
        assert_eq!(target, None);
    }
}
