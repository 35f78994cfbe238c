//! # 调用描述模块
//!
//! 用显式的描述符代替运行时反射：资源类型上的小函数构造出
//! 「方法标识 + 已求值的实参」，链接器据此得到路由值。
//!
//! ```
//! use routelinker::{Expression, MethodCall, Resource};
//!
//! struct FooController;
//! impl Resource for FooController {}
//!
//! impl FooController {
//!     fn get_by_id(id: i32) -> Expression<Self> {
//!         MethodCall::<Self>::new("GetById", &["id"]).arg(id).into()
//!     }
//! }
//!
//! let call = FooController::get_by_id(42);
//! assert!(call.as_call().is_some());
//! ```

use std::{fmt, marker::PhantomData};

use serde_json::Value;

use crate::{exception::Exception, param::CONTROLLER_SUFFIX, values::RouteValues};

/// 可以被链接的资源（控制器）类型。
pub trait Resource {
    /// 资源类型名，默认取 `std::any::type_name` 的最后一段（去掉泛型参数）。
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let without_generics = match full.find('<') {
            Some(i) => &full[..i],
            None => full,
        };
        without_generics
            .rsplit("::")
            .next()
            .unwrap_or(without_generics)
    }

    /// 路由值中使用的控制器名。
    fn controller_name() -> String {
        controller_name_of(Self::type_name())
    }
}

/// 控制器命名约定：转为小写并去掉末尾的 `controller` 后缀。
///
/// 如果类型名恰好就是 `Controller`，保留原名（小写）。
pub fn controller_name_of(type_name: &str) -> String {
    let lower = type_name.to_ascii_lowercase();
    match lower.strip_suffix(CONTROLLER_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => lower,
    }
}

/// 方法标识：资源类型名、方法名与按顺序排列的形参名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodInfo {
    resource: &'static str,
    name: &'static str,
    parameters: &'static [&'static str],
}

impl MethodInfo {
    pub fn of<R: Resource + ?Sized>(name: &'static str, parameters: &'static [&'static str]) -> Self {
        Self {
            resource: R::type_name(),
            name,
            parameters,
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parameters(&self) -> &'static [&'static str] {
        self.parameters
    }

    pub fn controller_name(&self) -> String {
        controller_name_of(self.resource)
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.resource, self.name, self.parameters.join(", "))
    }
}

/// 对资源 `R` 上某个方法的一次调用，实参在构造时即已求值。
pub struct MethodCall<R: ?Sized> {
    method: MethodInfo,
    arguments: Vec<Value>,
    _resource: PhantomData<fn() -> Box<R>>,
}

impl<R: Resource + ?Sized> MethodCall<R> {
    pub fn new(name: &'static str, parameters: &'static [&'static str]) -> Self {
        Self {
            method: MethodInfo::of::<R>(name, parameters),
            arguments: Vec::with_capacity(parameters.len()),
            _resource: PhantomData,
        }
    }

    /// 追加一个位置实参。
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }
}

impl<R: ?Sized> MethodCall<R> {
    pub fn method(&self) -> &MethodInfo {
        &self.method
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// 把形参名与实参值按位置绑定为路由值。
    ///
    /// 实参个数与形参个数不一致时返回 `InvalidExpression`。
    pub fn route_values(&self) -> Result<RouteValues, Exception> {
        let parameters = self.method.parameters();
        if parameters.len() != self.arguments.len() {
            return Err(Exception::InvalidExpression(format!(
                "{} expects {} argument(s) but {} were supplied",
                self.method,
                parameters.len(),
                self.arguments.len()
            )));
        }
        Ok(parameters
            .iter()
            .copied()
            .zip(self.arguments.iter().cloned())
            .collect())
    }
}

impl<R: ?Sized> Clone for MethodCall<R> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            arguments: self.arguments.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: ?Sized> fmt::Debug for MethodCall<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodCall")
            .field("method", &self.method)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// 资源 `R` 上的一个表达式。只有 `Call` 能生成链接，其余形状用于表示调用方传错了东西。
pub enum Expression<R: ?Sized> {
    /// `r => r.Method(args...)`
    Call(MethodCall<R>),
    /// `r => new T()`，携带被构造的类型名
    New(&'static str),
    /// `r => r.Property`，携带属性名
    Member(&'static str),
    /// `r => 常量`
    Constant(Value),
}

impl<R: ?Sized> Expression<R> {
    pub fn as_call(&self) -> Option<&MethodCall<R>> {
        match self {
            Expression::Call(call) => Some(call),
            _ => None,
        }
    }

    /// 表达式形状的简短描述，用于错误信息。
    pub fn shape(&self) -> &'static str {
        match self {
            Expression::Call(_) => "method call",
            Expression::New(_) => "object construction",
            Expression::Member(_) => "member access",
            Expression::Constant(_) => "constant",
        }
    }
}

impl<R: ?Sized> Clone for Expression<R> {
    fn clone(&self) -> Self {
        match self {
            Expression::Call(call) => Expression::Call(call.clone()),
            Expression::New(type_name) => Expression::New(*type_name),
            Expression::Member(name) => Expression::Member(*name),
            Expression::Constant(value) => Expression::Constant(value.clone()),
        }
    }
}

impl<R: ?Sized> fmt::Debug for Expression<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Call(call) => f.debug_tuple("Call").field(call).finish(),
            Expression::New(type_name) => f.debug_tuple("New").field(type_name).finish(),
            Expression::Member(name) => f.debug_tuple("Member").field(name).finish(),
            Expression::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
        }
    }
}

impl<R: ?Sized> From<MethodCall<R>> for Expression<R> {
    fn from(call: MethodCall<R>) -> Self {
        Expression::Call(call)
    }
}
