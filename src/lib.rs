pub mod config;
pub mod dispatcher;
pub mod exception;
pub mod expression;
pub mod linker;
pub mod param;
pub mod request;
pub mod route;
pub mod values;

pub use config::Config;
pub use dispatcher::{DefaultRouteDispatcher, Rouple, RouteDispatcher, RouteNameDispatcher};
pub use exception::Exception;
pub use expression::{Expression, MethodCall, MethodInfo, Resource};
pub use linker::{ResourceLinker, RouteLinker};
pub use request::{Request, RequestContext};
pub use route::{Route, RouteCollection, RouteDefault, RouteTemplate, VirtualPath};
pub use values::RouteValues;
