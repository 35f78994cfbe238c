//! # 路由调度模块
//!
//! 控制器名与动作名的约定因项目而异，`RouteDispatcher` 负责把
//! 「方法标识 + 路由值」映射为「路由名 + 最终路由值」（`Rouple`）。
//!
//! 内置两种策略：
//! - `DefaultRouteDispatcher`：只应用控制器命名约定，由路由表按顺序选择路由。
//! - `RouteNameDispatcher`：为指定方法显式选择命名路由，其余方法回退到默认约定。
//!
//! 调用方可以自行实现该 trait，闭包 `Fn(&MethodInfo, &RouteValues) -> Rouple` 也直接可用。

use std::collections::HashMap;

use log::debug;

use crate::{expression::MethodInfo, param::CONTROLLER_KEY, values::RouteValues};

/// 路由名与路由值组成的二元组
#[derive(Debug, Clone, PartialEq)]
pub struct Rouple {
    route_name: Option<String>,
    route_values: RouteValues,
}

impl Rouple {
    pub fn new(route_name: impl Into<String>, route_values: RouteValues) -> Self {
        Self {
            route_name: Some(route_name.into()),
            route_values,
        }
    }

    /// 不指定路由名，交给路由表按注册顺序选择。
    pub fn unnamed(route_values: RouteValues) -> Self {
        Self {
            route_name: None,
            route_values,
        }
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    pub fn route_values(&self) -> &RouteValues {
        &self.route_values
    }

    pub fn into_parts(self) -> (Option<String>, RouteValues) {
        (self.route_name, self.route_values)
    }
}

pub trait RouteDispatcher {
    fn dispatch(&self, method: &MethodInfo, route_values: &RouteValues) -> Rouple;
}

impl<F> RouteDispatcher for F
where
    F: Fn(&MethodInfo, &RouteValues) -> Rouple,
{
    fn dispatch(&self, method: &MethodInfo, route_values: &RouteValues) -> Rouple {
        self(method, route_values)
    }
}

/// 按控制器命名约定补齐 `controller` 路由值。
fn with_controller(method: &MethodInfo, route_values: &RouteValues) -> RouteValues {
    let mut values = route_values.clone();
    values.insert(CONTROLLER_KEY, method.controller_name());
    values
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultRouteDispatcher {
    route_name: Option<String>,
}

impl DefaultRouteDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 总是使用指定的命名路由。
    pub fn with_route_name(route_name: impl Into<String>) -> Self {
        Self {
            route_name: Some(route_name.into()),
        }
    }

    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }
}

impl RouteDispatcher for DefaultRouteDispatcher {
    fn dispatch(&self, method: &MethodInfo, route_values: &RouteValues) -> Rouple {
        let values = with_controller(method, route_values);
        match &self.route_name {
            Some(name) => Rouple::new(name.clone(), values),
            None => Rouple::unnamed(values),
        }
    }
}

/// 为指定方法显式选择命名路由的调度器
#[derive(Debug, Clone, Default)]
pub struct RouteNameDispatcher {
    routes: HashMap<MethodInfo, String>,
    fallback: DefaultRouteDispatcher,
}

impl RouteNameDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未映射方法使用的回退调度器。
    pub fn with_fallback(fallback: DefaultRouteDispatcher) -> Self {
        Self {
            routes: HashMap::new(),
            fallback,
        }
    }

    pub fn map(mut self, method: MethodInfo, route_name: impl Into<String>) -> Self {
        self.routes.insert(method, route_name.into());
        self
    }

    pub fn route_for(&self, method: &MethodInfo) -> Option<&str> {
        self.routes.get(method).map(String::as_str)
    }
}

impl RouteDispatcher for RouteNameDispatcher {
    fn dispatch(&self, method: &MethodInfo, route_values: &RouteValues) -> Rouple {
        match self.routes.get(method) {
            Some(name) => {
                debug!("{}映射到命名路由{}", method, name);
                Rouple::new(name.clone(), with_controller(method, route_values))
            }
            None => self.fallback.dispatch(method, route_values),
        }
    }
}
