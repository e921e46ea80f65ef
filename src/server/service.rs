use super::request::RequestHead;
use super::response::write_response;
use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::error::ApiError;
use crate::router::Router;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use std::io::{self, Read};
use std::sync::Arc;
use tracing::debug;

/// Transport-neutral request pipeline: preflight, routing, dispatch.
///
/// Cloned once per connection by `may_minihttp`; clones share the router
/// and dispatcher.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppService {
    pub fn new(router: Router, dispatcher: Dispatcher) -> Self {
        Self {
            router: Arc::new(router),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Produce the response for one request.
    ///
    /// `body` is read only if the selected handler asks for it.
    pub fn handle(&self, head: RequestHead, body: &mut dyn Read) -> HandlerResponse {
        let RequestHead {
            method,
            path,
            request_id,
        } = head;

        // Preflight short-circuits before the route table is consulted.
        if method.eq_ignore_ascii_case("OPTIONS") {
            debug!(request_id = %request_id, path = %path, "CORS preflight");
            return HandlerResponse::preflight();
        }

        let Ok(method) = Method::from_bytes(method.as_bytes()) else {
            debug!(request_id = %request_id, method = %method, "Unparseable method");
            return ApiError::RouteNotFound.into_response();
        };

        match self.router.route(&method, &path) {
            Some(route_match) => {
                self.dispatcher
                    .dispatch(route_match, request_id, method, path, body)
            }
            None => ApiError::RouteNotFound.into_response(),
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let head = RequestHead::from_minihttp(&req);
        let mut body = req.body();
        let resp = self.handle(head, &mut body);
        write_response(res, &resp);
        Ok(())
    }
}
