// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 资源链接器
//!
//! 把一个强类型的调用描述翻译为绝对 URI：
//! 1. 校验表达式：必须存在，且必须是单一的方法调用。
//! 2. 按形参名绑定实参，并按约定注入 `controller` 路由值。
//! 3. 交给调度器选择路由名与最终路由值。
//! 4. 由请求上的路由表生成虚拟路径，再把它设置为请求授权部分的路径与查询字符串。
//!    虚拟路径不会被当作相对引用解析，路由值无法改写 scheme 或 host。

use log::{debug, warn};
use url::Url;

use crate::{
    dispatcher::{DefaultRouteDispatcher, RouteDispatcher},
    exception::Exception,
    expression::{Expression, Resource},
    param::CONTROLLER_KEY,
    request::{Request, RequestContext},
};

/// 能为资源上的动作生成链接的组件。
pub trait ResourceLinker {
    /// 生成 `expression` 所描述动作的绝对 URI。
    ///
    /// # Errors
    /// - `NullArgument`：`expression` 为 `None`。
    /// - `InvalidExpression`：表达式不是单一方法调用，或实参个数不对。
    /// - `UnknownRoute` / `NoMatchingRoute`：路由表无法生成虚拟路径。
    /// - `MissingHost` / `InvalidUri`：请求的授权部分不可用。
    fn get_uri<R: Resource + ?Sized>(
        &self,
        expression: impl Into<Option<Expression<R>>>,
    ) -> Result<Url, Exception>;
}

/// 基于请求路由表的链接器。
///
/// 链接器持有请求，释放链接器即释放请求，且只释放一次。
#[derive(Debug)]
pub struct RouteLinker<Q: RequestContext = Request, D: RouteDispatcher = DefaultRouteDispatcher> {
    request: Q,
    dispatcher: D,
    disposed: bool,
}

impl<Q: RequestContext> RouteLinker<Q, DefaultRouteDispatcher> {
    /// 使用默认调度器构建链接器。
    pub fn new(request: Q) -> Self {
        Self::with_dispatcher(request, DefaultRouteDispatcher::new())
    }
}

impl<Q: RequestContext, D: RouteDispatcher> RouteLinker<Q, D> {
    pub fn with_dispatcher(request: Q, dispatcher: D) -> Self {
        Self {
            request,
            dispatcher,
            disposed: false,
        }
    }

    pub fn request(&self) -> &Q {
        &self.request
    }

    pub fn route_dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// 释放持有的请求。重复调用不会再次释放。
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.request.dispose();
    }
}

impl<Q: RequestContext, D: RouteDispatcher> ResourceLinker for RouteLinker<Q, D> {
    fn get_uri<R: Resource + ?Sized>(
        &self,
        expression: impl Into<Option<Expression<R>>>,
    ) -> Result<Url, Exception> {
        let id = self.request.id();
        let expression = expression
            .into()
            .ok_or(Exception::NullArgument("expression"))?;
        let call = match &expression {
            Expression::Call(call) => call,
            other => {
                warn!("[ID{}]表达式不是方法调用：{}", id, other.shape());
                return Err(Exception::InvalidExpression(format!(
                    "expected a single method call on {} but got a {}",
                    R::type_name(),
                    other.shape()
                )));
            }
        };

        let mut route_values = call.route_values()?;
        route_values.insert(CONTROLLER_KEY, R::controller_name());

        let (route_name, route_values) = self
            .dispatcher
            .dispatch(call.method(), &route_values)
            .into_parts();
        debug!(
            "[ID{}]{}调度至路由{}",
            id,
            call.method(),
            route_name.as_deref().unwrap_or("<default>")
        );

        let virtual_path = self
            .request
            .routes()
            .get_virtual_path(route_name.as_deref(), &route_values)?
            .ok_or_else(|| {
                warn!("[ID{}]没有路由能够生成{}的链接", id, call.method());
                Exception::NoMatchingRoute
            })?;
        debug!(
            "[ID{}]路由{}生成虚拟路径：{}",
            id, virtual_path.route_name, virtual_path.path
        );

        let mut uri = self.request.authority()?;
        let (path, query) = virtual_path.path_and_query();
        uri.set_path(&format!("/{}", path));
        uri.set_query(query);
        Ok(uri)
    }
}

impl<Q: RequestContext, D: RouteDispatcher> Drop for RouteLinker<Q, D> {
    fn drop(&mut self) {
        self.dispose();
    }
}
