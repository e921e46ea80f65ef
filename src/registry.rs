//! Route table and handler registration.

use crate::dispatcher::Dispatcher;
use crate::handlers::{self, AppState};
use crate::middleware::TracingMiddleware;
use crate::router::{RouteMeta, Router};
use crate::server::AppService;
use anyhow::Context;
use http::Method;
use std::sync::Arc;

/// The route table in match priority order.
///
/// The id routes claim everything under `/api/users/`; the handlers read the
/// id from the first segment after that prefix.
#[must_use]
pub fn routes() -> Vec<RouteMeta> {
    vec![
        RouteMeta::new(Method::GET, "/", "describe_api"),
        RouteMeta::new(Method::GET, "/api/users", "list_users"),
        RouteMeta::new(Method::GET, "/api/users/{id*}", "get_user"),
        RouteMeta::new(Method::POST, "/api/users", "create_user"),
        RouteMeta::new(Method::PUT, "/api/users/{id*}", "update_user"),
        RouteMeta::new(Method::DELETE, "/api/users/{id*}", "delete_user"),
        RouteMeta::new(Method::GET, "/api/health", "health_check"),
    ]
}

/// Register one handler per entry in [`routes`], all sharing `state`.
pub fn register_all(dispatcher: &mut Dispatcher, state: &AppState) {
    dispatcher.register_handler("describe_api", handlers::describe_api);

    let s = state.share();
    dispatcher.register_handler("list_users", move |req| handlers::list_users(&s, req));
    let s = state.share();
    dispatcher.register_handler("get_user", move |req| handlers::get_user(&s, req));
    let s = state.share();
    dispatcher.register_handler("create_user", move |req| handlers::create_user(&s, req));
    let s = state.share();
    dispatcher.register_handler("update_user", move |req| handlers::update_user(&s, req));
    let s = state.share();
    dispatcher.register_handler("delete_user", move |req| handlers::delete_user(&s, req));
    let s = state.share();
    dispatcher.register_handler("health_check", move |req| handlers::health_check(&s, req));
}

/// Wire the route table, handlers and request logging into one service.
///
/// # Errors
///
/// Fails only if a route pattern does not compile.
pub fn build_service(state: &AppState) -> anyhow::Result<AppService> {
    let router = Router::new(routes()).context("compiling route table")?;
    let mut dispatcher = Dispatcher::new();
    register_all(&mut dispatcher, state);
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    Ok(AppService::new(router, dispatcher))
}
