// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了链接生成所遵循的常量和数据结构，包括：
//! - 默认路由的名称与模板。
//! - 控制器命名约定相关的常量。
//! - 路由模板占位符的正则表达式。
//! - 请求解析接受的 HTTP 方法与版本。

use lazy_static::lazy_static;
use regex::Regex;

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 未显式指定协议时使用的 URI scheme
pub const DEFAULT_SCHEME: &str = "http";

/// 默认 API 路由的名称
pub const DEFAULT_ROUTE_NAME: &str = "API Default";

/// 默认 API 路由的模板
pub const DEFAULT_ROUTE_TEMPLATE: &str = "api/{controller}/{id}";

/// 控制器类型名的约定后缀（比较时忽略大小写）
pub const CONTROLLER_SUFFIX: &str = "controller";

/// 存放控制器名的路由值键
pub const CONTROLLER_KEY: &str = "controller";

/// 存放动作名的路由值键
pub const ACTION_KEY: &str = "action";

/// 只参与模板匹配、永远不会出现在查询字符串中的路由值键。
pub const RESERVED_KEYS: [&str; 2] = [CONTROLLER_KEY, ACTION_KEY];

lazy_static! {
    /// 匹配一个完整的参数段：`{name}`、`{name?}` 或 `{*name}`。
    ///
    /// 捕获组 1 为 catch-all 标记，2 为参数名，3 为可选标记。
    pub static ref PARAMETER_SEGMENT: Regex =
        Regex::new(r"^\{(\*)?([A-Za-z_][A-Za-z0-9_]*)(\?)?\}$").unwrap();
}

/// 请求行中接受的 HTTP 方法
pub const SUPPORTED_METHODS: [&str; 6] = ["GET", "HEAD", "OPTIONS", "POST", "PUT", "DELETE"];

/// 请求行中接受的 HTTP 协议版本
pub const SUPPORTED_VERSIONS: [&str; 2] = ["HTTP/1.0", "HTTP/1.1"];
