// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求模块
//!
//! 链接器只从当前请求读取两样东西：URI 的授权部分（scheme/host/port）以及请求上挂载的路由表。
//! 该模块负责：
//! 1. 从原始字节解析请求行（校验方法与版本，保留路径）与 `Host`、`X-Forwarded-Proto` 标头。
//! 2. 保存请求正文，直到请求被释放（dispose）。
//! 3. 通过 `RequestContext` trait 向链接器暴露上述信息。

use std::sync::Arc;

use log::{debug, error};
use url::Url;

use crate::{exception::Exception, param::*, route::RouteCollection};

/// 链接器所依赖的当前请求。
pub trait RequestContext {
    /// 请求 ID，用于日志追踪
    fn id(&self) -> u128;
    /// `scheme://host[:port]/` 形式的授权部分
    fn authority(&self) -> Result<Url, Exception>;
    /// 请求上挂载的路由表
    fn routes(&self) -> &RouteCollection;
    /// 释放请求持有的资源，多次调用安全
    fn dispose(&mut self);
}

/// 表示一个 HTTP 请求的元数据，以及它所挂载的路由配置。
#[derive(Debug, Clone)]
pub struct Request {
    id: u128,
    /// 请求的资源路径（包含查询字符串）
    path: String,
    /// `Host` 标头，可能带端口
    host: Option<String>,
    scheme: String,
    /// 请求正文，释放后为 `None`
    content: Option<String>,
    routes: Arc<RouteCollection>,
    disposed: bool,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 验证编码：确保请求数据是合法的 UTF-8 字符串。
    /// 2. 解析请求行：校验方法和协议版本，提取路径。
    /// 3. 迭代解析标头，直到空行为止；空行之后的内容作为正文保存。
    ///
    /// # 参数
    /// * `buffer` - 原始请求数据。
    /// * `id` - 请求 ID，用于追踪日志。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        // 1. 将字节流转换为字符串，失败则判定为非法的 HTTP 请求
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let (head, body) = match request_string.split_once("\r\n\r\n") {
            Some((head, body)) => (head, Some(body)),
            None => (request_string, None),
        };
        let request_lines: Vec<&str> = head.split(CRLF).collect();

        // 2. 解析请求行 (e.g., "GET /index.html HTTP/1.1")
        let first_line_parts: Vec<&str> = request_lines[0].split(' ').collect();
        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_lines[0]);
            return Err(Exception::UnSupportedRequestMethod);
        }

        let method_str = first_line_parts[0].to_uppercase();
        if !SUPPORTED_METHODS.contains(&method_str.as_str()) {
            error!("[ID{}]不支持的HTTP请求方法：{}", id, &method_str);
            return Err(Exception::UnSupportedRequestMethod);
        }

        let version_str = first_line_parts[first_line_parts.len() - 1].to_uppercase();
        if !SUPPORTED_VERSIONS.contains(&version_str.as_str()) {
            error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
            return Err(Exception::UnsupportedHttpVersion);
        }

        // 路径中可能包含空格，虽然不规范，但通过 join 尝试恢复
        let path = first_line_parts[1..first_line_parts.len() - 1].join(" ");

        // 3. 迭代各行解析 Headers
        let mut host = None;
        let mut scheme = DEFAULT_SCHEME.to_string();
        for line in &request_lines[1..] {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match name.trim().to_lowercase().as_str() {
                "host" => host = Some(value.to_string()),
                "x-forwarded-proto" => scheme = value.to_lowercase(),
                _ => {}
            }
        }

        Ok(Self {
            id,
            path,
            host,
            scheme,
            content: body.filter(|b| !b.is_empty()).map(str::to_string),
            routes: Arc::new(RouteCollection::new()),
            disposed: false,
        })
    }

    /// 从绝对 URI 构建请求，授权部分与路径都取自该 URI。
    pub fn from_uri(uri: &str, id: u128) -> Result<Self, Exception> {
        let url = Url::parse(uri)?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => return Err(Exception::MissingHost),
        };
        let path = match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        };
        Ok(Self {
            id,
            path,
            host: Some(host),
            scheme: url.scheme().to_string(),
            content: None,
            routes: Arc::new(RouteCollection::new()),
            disposed: false,
        })
    }

    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_lowercase();
        self
    }

    /// 挂载共享的路由表。
    pub fn with_routes(mut self, routes: Arc<RouteCollection>) -> Self {
        self.routes = routes;
        self
    }

    /// 获取可修改的路由表；若路由表被其他请求共享，则先复制一份。
    pub fn routes_mut(&mut self) -> &mut RouteCollection {
        Arc::make_mut(&mut self.routes)
    }

    /// 向路由表注册 `API Default` 路由。
    pub fn add_default_route(&mut self) -> Result<&mut Self, Exception> {
        self.routes_mut().add_default_route()?;
        Ok(self)
    }

    /// 请求的绝对 URI：授权部分加上请求路径。
    pub fn request_uri(&self) -> Result<Url, Exception> {
        Ok(self.authority()?.join(&self.path)?)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

impl RequestContext for Request {
    fn id(&self) -> u128 {
        self.id
    }

    fn authority(&self) -> Result<Url, Exception> {
        let host = self.host.as_deref().ok_or(Exception::MissingHost)?;
        let url = Url::parse(&format!("{}://{}/", self.scheme, host))?;
        // Host 中混入路径或用户信息时，解析结果会偏离纯授权部分
        if url.path() != "/" || !url.username().is_empty() || url.query().is_some() {
            return Err(Exception::InvalidUri(format!("invalid host '{}'", host)));
        }
        Ok(url)
    }

    fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.content = None;
        self.disposed = true;
        debug!("[ID{}]请求已释放", self.id);
    }
}
