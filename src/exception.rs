// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了链接生成过程中可能出现的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了参数缺失、调用描述形状错误、路由表解析失败以及请求解析错误。
//! - **直接上抛**：所有错误都以 `Result` 的形式同步返回给调用方，链接器本身不做重试或吞掉错误。
//! - **用户友好**：通过实现 `std::fmt::Display`，确保错误信息可以被安全地记录到日志中。

use std::fmt;

/// 生成链接或解析请求过程中发生的异常类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 必需的输入缺失，携带参数名（例如 `expression`）。
    NullArgument(&'static str),
    /// 传入的表达式不是单一的方法调用，或者实参个数与形参不匹配。
    InvalidExpression(String),
    /// 调度器指定的命名路由在路由表中不存在。
    UnknownRoute(String),
    /// 路由表中没有任何路由能够绑定给定的路由值。
    NoMatchingRoute,
    /// 路由模板格式非法。
    InvalidRouteTemplate(String),
    /// 同名路由被重复注册。
    DuplicateRoute(String),
    /// 请求中缺少 `Host` 标头，无法确定 URI 的授权部分。
    MissingHost,
    /// 无法将授权部分或虚拟路径组合为合法的绝对 URI。
    InvalidUri(String),
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行格式错误或使用了不支持的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 客户端使用了不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 配置文件无法读取。
    ConfigUnreadable(String),
    /// 配置文件内容无法解析为合法配置。
    ConfigInvalid(String),
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullArgument(name) => write!(f, "Value cannot be null (parameter '{}')", name),
            InvalidExpression(reason) => write!(f, "Invalid expression: {}", reason),
            UnknownRoute(name) => write!(f, "A route named '{}' could not be found", name),
            NoMatchingRoute => write!(f, "No route matches the supplied route values"),
            InvalidRouteTemplate(reason) => write!(f, "Invalid route template: {}", reason),
            DuplicateRoute(name) => write!(f, "A route named '{}' is already registered", name),
            MissingHost => write!(f, "Request has no Host header"),
            InvalidUri(reason) => write!(f, "Invalid URI: {}", reason),
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            ConfigUnreadable(reason) => write!(f, "Couldn't read config file: {}", reason),
            ConfigInvalid(reason) => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl std::error::Error for Exception {}

impl From<url::ParseError> for Exception {
    fn from(e: url::ParseError) -> Self {
        InvalidUri(e.to_string())
    }
}
