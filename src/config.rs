use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

use log::{error, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::prelude::*;

use crate::exception::Exception;
use crate::param::{DEFAULT_ROUTE_NAME, DEFAULT_ROUTE_TEMPLATE, DEFAULT_SCHEME};
use crate::route::{Route, RouteCollection, RouteDefault};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteConfig {
    name: String,
    template: String,
    #[serde(default)]
    defaults: BTreeMap<String, Value>,
    #[serde(default)]
    optional: Vec<String>,
}

impl RouteConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn to_route(&self) -> Result<Route, Exception> {
        let mut defaults: std::collections::HashMap<String, RouteDefault> = self
            .defaults
            .iter()
            .map(|(k, v)| (k.clone(), RouteDefault::Value(v.clone())))
            .collect();
        for key in &self.optional {
            if defaults.contains_key(key) {
                warn!("路由{}的参数{}同时被设置为默认值和可缺省，以可缺省为准", self.name, key);
            }
            defaults.insert(key.clone(), RouteDefault::Optional);
        }
        Route::new(&self.name, &self.template, defaults)
    }
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_routes() -> Vec<RouteConfig> {
    vec![RouteConfig {
        name: DEFAULT_ROUTE_NAME.to_string(),
        template: DEFAULT_ROUTE_TEMPLATE.to_string(),
        defaults: BTreeMap::new(),
        optional: vec!["id".to_string()],
    }]
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_scheme")]
    scheme: String,
    #[serde(default = "default_routes")]
    routes: Vec<RouteConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            scheme: default_scheme(),
            routes: default_routes(),
        }
    }

    pub fn from_toml(filename: &str) -> Result<Self, Exception> {
        let mut file = File::open(filename).map_err(|e| {
            error!("无法打开配置文件{}：{}", filename, e);
            Exception::ConfigUnreadable(format!("{}: {}", filename, e))
        })?;
        let mut str_val = String::new();
        file.read_to_string(&mut str_val)
            .map_err(|e| Exception::ConfigUnreadable(format!("{}: {}", filename, e)))?;
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Exception> {
        let mut raw_config: Config = toml::from_str(text).map_err(|e| {
            error!("无法成功从配置文件构建配置对象：{}", e);
            Exception::ConfigInvalid(e.to_string())
        })?;
        raw_config.scheme = raw_config.scheme.to_lowercase();
        if raw_config.scheme != "http" && raw_config.scheme != "https" {
            return Err(Exception::ConfigInvalid(format!(
                "unsupported scheme '{}'",
                raw_config.scheme
            )));
        }
        if raw_config.routes.is_empty() {
            warn!("配置中没有任何路由，所有链接生成都将失败");
        }
        Ok(raw_config)
    }

    /// 按配置顺序构建路由表。
    pub fn route_collection(&self) -> Result<RouteCollection, Exception> {
        let mut routes = RouteCollection::new();
        for route in &self.routes {
            routes.add(route.to_route()?)?;
        }
        Ok(routes)
    }
}

impl Config {
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn routes(&self) -> &[RouteConfig] {
        &self.routes
    }
}
