//! # 路由值模块
//!
//! `RouteValues` 是参数名到装箱值（`serde_json::Value`）的映射。
//! 键的比较忽略 ASCII 大小写；遍历顺序即插入顺序，以保证生成的查询字符串是确定的。

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// RFC 3986 中的非保留字符之外全部编码。
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 路径段中额外允许的子分隔符。
const PATH_SEGMENT: &AsciiSet = &UNRESERVED
    .remove(b'!')
    .remove(b'$')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b',')
    .remove(b';')
    .remove(b':')
    .remove(b'@');

/// catch-all 参数可以跨越多个路径段。
const CATCH_ALL: &AsciiSet = &PATH_SEGMENT.remove(b'/');

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteValues {
    entries: Vec<(String, Value)>,
}

impl RouteValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或替换一个路由值，替换时保留原有位置和原有键名。
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// 获取非 null 的值，null 与缺失同义。
    pub fn get_present(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RouteValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = RouteValues::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

/// 将路由值渲染为文本。
///
/// 字符串原样输出，数字与布尔使用其 JSON 文本，数组与对象使用紧凑 JSON；null 视为缺失。
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// 两个路由值按文本比较是否相等（忽略 ASCII 大小写）。
pub fn values_match(a: &Value, b: &Value) -> bool {
    match (render_value(a), render_value(b)) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(&b),
        (None, None) => true,
        _ => false,
    }
}

/// `.` 与 `..` 在 URL 路径中总是被当作点段折叠（编码成 `%2E` 也一样），无法原样保留。
pub fn is_dot_segment(text: &str) -> bool {
    text == "." || text == ".."
}

pub fn encode_segment(text: &str) -> String {
    utf8_percent_encode(text, PATH_SEGMENT).to_string()
}

pub fn encode_catch_all(text: &str) -> String {
    utf8_percent_encode(text, CATCH_ALL).to_string()
}

pub fn encode_query_component(text: &str) -> String {
    utf8_percent_encode(text, UNRESERVED).to_string()
}
