// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由表模块
//!
//! 负责把「路由名 + 路由值」反向生成为虚拟路径（path 与 query 部分）。
//! 这里只做出站方向的 URL 生成，不参与入站请求的匹配与分发。
//!
//! ## 生成规则
//! 1. 模板中不存在的默认值键充当约束：提供的值与默认值不同则不匹配。
//! 2. 参数段优先使用提供的值，其次使用具体默认值；必需参数两者皆无则不匹配。
//! 3. 末尾未设置或等于默认值的参数段被省略。
//! 4. 剩余未被模板消费、未被默认值覆盖且非保留键的值追加为查询字符串。

use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use crate::{
    exception::Exception,
    param::{DEFAULT_ROUTE_NAME, DEFAULT_ROUTE_TEMPLATE, PARAMETER_SEGMENT, RESERVED_KEYS},
    values::{
        encode_catch_all, encode_query_component, encode_segment, is_dot_segment, render_value,
        values_match, RouteValues,
    },
};

/// 路由参数的默认值
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDefault {
    /// 具体的默认值
    Value(Value),
    /// 参数可以缺省
    Optional,
}

impl From<Value> for RouteDefault {
    fn from(value: Value) -> Self {
        RouteDefault::Value(value)
    }
}

impl From<&str> for RouteDefault {
    fn from(value: &str) -> Self {
        RouteDefault::Value(Value::from(value))
    }
}

impl From<String> for RouteDefault {
    fn from(value: String) -> Self {
        RouteDefault::Value(Value::from(value))
    }
}

impl From<i64> for RouteDefault {
    fn from(value: i64) -> Self {
        RouteDefault::Value(Value::from(value))
    }
}

impl From<bool> for RouteDefault {
    fn from(value: bool) -> Self {
        RouteDefault::Value(Value::from(value))
    }
}

/// 模板中的一个路径段
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Parameter {
        name: String,
        optional: bool,
        catch_all: bool,
    },
}

/// 解析后的路由模板，例如 `api/{controller}/{id}`。
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// 解析路由模板。
    ///
    /// 只支持整段参数（`{a}-{b}` 这种复合段会被拒绝）；catch-all 参数只能位于最后一段且总是可缺省；
    /// 模板不能以 `/` 或 `~` 开头，不能含有 `.`、`..` 段，参数名不能重复。
    pub fn parse(template: &str) -> Result<Self, Exception> {
        if template.starts_with('/') || template.starts_with('~') {
            return Err(Exception::InvalidRouteTemplate(format!(
                "'{}' must not start with '/' or '~'",
                template
            )));
        }
        // `?` 只能作为可选参数的标记出现在 `}` 之前
        let stray_question_mark = template
            .match_indices('?')
            .any(|(i, _)| !template[i + 1..].starts_with('}'));
        if stray_question_mark {
            return Err(Exception::InvalidRouteTemplate(format!(
                "'{}' must not contain a query string",
                template
            )));
        }

        let mut segments = Vec::new();
        if !template.is_empty() {
            let parts: Vec<&str> = template.split('/').collect();
            for (i, part) in parts.iter().enumerate() {
                if part.is_empty() {
                    return Err(Exception::InvalidRouteTemplate(format!(
                        "'{}' contains an empty segment",
                        template
                    )));
                }
                let segment = match PARAMETER_SEGMENT.captures(part) {
                    Some(caps) => {
                        let catch_all = caps.get(1).is_some();
                        if catch_all && i != parts.len() - 1 {
                            return Err(Exception::InvalidRouteTemplate(format!(
                                "catch-all parameter in '{}' must be the last segment",
                                template
                            )));
                        }
                        Segment::Parameter {
                            name: caps[2].to_string(),
                            optional: catch_all || caps.get(3).is_some(),
                            catch_all,
                        }
                    }
                    None if part.contains('{') || part.contains('}') => {
                        return Err(Exception::InvalidRouteTemplate(format!(
                            "segment '{}' is not a supported parameter",
                            part
                        )));
                    }
                    None if is_dot_segment(part) => {
                        return Err(Exception::InvalidRouteTemplate(format!(
                            "'{}' contains a dot segment",
                            template
                        )));
                    }
                    None => Segment::Literal(part.to_string()),
                };
                segments.push(segment);
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for name in segments.iter().filter_map(parameter_name) {
            if seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                return Err(Exception::InvalidRouteTemplate(format!(
                    "parameter '{}' appears more than once in '{}'",
                    name, template
                )));
            }
            seen.push(name);
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_parameter(&self, key: &str) -> bool {
        self.segments
            .iter()
            .filter_map(parameter_name)
            .any(|name| name.eq_ignore_ascii_case(key))
    }
}

fn parameter_name(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::Parameter { name, .. } => Some(name.as_str()),
        Segment::Literal(_) => None,
    }
}

/// 路由表中的一条命名路由
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    name: String,
    template: RouteTemplate,
    defaults: HashMap<String, RouteDefault>,
}

impl Route {
    pub fn new(
        name: &str,
        template: &str,
        defaults: HashMap<String, RouteDefault>,
    ) -> Result<Self, Exception> {
        Ok(Self {
            name: name.to_string(),
            template: RouteTemplate::parse(template)?,
            defaults: defaults
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    pub fn defaults(&self) -> &HashMap<String, RouteDefault> {
        &self.defaults
    }

    fn default_for(&self, key: &str) -> Option<&RouteDefault> {
        self.defaults.get(&key.to_ascii_lowercase())
    }

    /// 尝试用给定路由值生成该路由的虚拟路径，不匹配时返回 `None`。
    pub fn bind(&self, values: &RouteValues) -> Option<String> {
        // 1. 默认值约束
        for (key, default) in &self.defaults {
            if self.template.has_parameter(key) {
                continue;
            }
            if let (RouteDefault::Value(expected), Some(actual)) = (default, values.get_present(key))
            {
                if !values_match(expected, actual) {
                    debug!(
                        "路由{}不匹配：{}={}与默认值{}冲突",
                        self.name, key, actual, expected
                    );
                    return None;
                }
            }
        }

        // 2. 逐段取值：(段, 渲染值, 是否可省略)
        let mut rendered: Vec<(&Segment, Option<String>, bool)> = Vec::new();
        for segment in &self.template.segments {
            match segment {
                Segment::Literal(text) => rendered.push((segment, Some(text.clone()), false)),
                Segment::Parameter { name, optional, .. } => {
                    let default = self.default_for(name);
                    let supplied = values.get_present(name);
                    // 空字符串与未设置同义
                    let value = match (supplied, default) {
                        (Some(v), _) => render_value(v),
                        (None, Some(RouteDefault::Value(d))) => render_value(d),
                        _ => None,
                    }
                    .filter(|v| !v.is_empty());
                    let droppable = match (&value, default) {
                        (None, _) => true,
                        (Some(v), Some(RouteDefault::Value(d))) => {
                            values_match(&Value::String(v.clone()), d)
                        }
                        _ => false,
                    };
                    let may_be_missing =
                        *optional || matches!(default, Some(RouteDefault::Optional));
                    if value.is_none() && !may_be_missing {
                        debug!("路由{}不匹配：缺少必需参数{}", self.name, name);
                        return None;
                    }
                    rendered.push((segment, value, droppable));
                }
            }
        }

        // 3. 省略末尾可省略的段
        while let Some((_, _, true)) = rendered.last() {
            rendered.pop();
        }
        if rendered.iter().any(|(_, value, _)| value.is_none()) {
            debug!("路由{}不匹配：缺省参数之后仍有参数段", self.name);
            return None;
        }

        let mut parts = Vec::with_capacity(rendered.len());
        for (segment, value, _) in &rendered {
            let Some(value) = value.as_deref() else {
                continue;
            };
            let part = match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Parameter {
                    name, catch_all, ..
                } => {
                    let dotted = if *catch_all {
                        value.split('/').any(is_dot_segment)
                    } else {
                        is_dot_segment(value)
                    };
                    if dotted {
                        debug!("路由{}不匹配：参数{}的值{}是点段", self.name, name, value);
                        return None;
                    }
                    if *catch_all {
                        encode_catch_all(value)
                    } else {
                        encode_segment(value)
                    }
                }
            };
            parts.push(part);
        }
        let path = parts.join("/");

        // 4. 剩余值进入查询字符串
        let query = values
            .iter()
            .filter(|(key, _)| !self.template.has_parameter(key))
            .filter(|(key, _)| self.default_for(key).is_none())
            .filter(|(key, _)| !RESERVED_KEYS.iter().any(|r| r.eq_ignore_ascii_case(key)))
            .filter_map(|(key, value)| {
                render_value(value).map(|v| {
                    format!(
                        "{}={}",
                        encode_query_component(key),
                        encode_query_component(&v)
                    )
                })
            })
            .collect::<Vec<String>>()
            .join("&");

        if query.is_empty() {
            Some(path)
        } else {
            Some(format!("{}?{}", path, query))
        }
    }
}

/// 路由表生成的虚拟路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath {
    /// 实际完成绑定的路由名
    pub route_name: String,
    /// 相对的 `path[?query]`，不以 `/` 开头
    pub path: String,
}

impl VirtualPath {
    /// 拆分出路径与查询字符串。路径段与查询值中的 `?` 都已被编码，第一个 `?` 即分隔符。
    pub fn path_and_query(&self) -> (&str, Option<&str>) {
        match self.path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (self.path.as_str(), None),
        }
    }
}

/// 按注册顺序排列的命名路由集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCollection {
    routes: Vec<Route>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: Route) -> Result<&mut Self, Exception> {
        if self.get(route.name()).is_some() {
            return Err(Exception::DuplicateRoute(route.name().to_string()));
        }
        self.routes.push(route);
        Ok(self)
    }

    pub fn add_route<I, K, D>(
        &mut self,
        name: &str,
        template: &str,
        defaults: I,
    ) -> Result<&mut Self, Exception>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<RouteDefault>,
    {
        let defaults = defaults
            .into_iter()
            .map(|(k, d)| (k.into(), d.into()))
            .collect();
        self.add(Route::new(name, template, defaults)?)
    }

    /// 注册 `API Default` 路由：`api/{controller}/{id}`，其中 `id` 可缺省。
    pub fn add_default_route(&mut self) -> Result<&mut Self, Exception> {
        self.add_route(
            DEFAULT_ROUTE_NAME,
            DEFAULT_ROUTE_TEMPLATE,
            [("id", RouteDefault::Optional)],
        )
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// 为路由值生成虚拟路径。
    ///
    /// 指定路由名时只尝试该路由，名字不存在返回 `UnknownRoute`；
    /// 未指定时按注册顺序返回第一条能够绑定的路由。没有路由能绑定时返回 `Ok(None)`。
    pub fn get_virtual_path(
        &self,
        route_name: Option<&str>,
        values: &RouteValues,
    ) -> Result<Option<VirtualPath>, Exception> {
        match route_name {
            Some(name) => {
                let route = self
                    .get(name)
                    .ok_or_else(|| Exception::UnknownRoute(name.to_string()))?;
                Ok(route.bind(values).map(|path| VirtualPath {
                    route_name: route.name().to_string(),
                    path,
                }))
            }
            None => Ok(self.routes.iter().find_map(|route| {
                route.bind(values).map(|path| VirtualPath {
                    route_name: route.name().to_string(),
                    path,
                })
            })),
        }
    }
}
