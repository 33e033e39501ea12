use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::{Ready, ready};

use super::request_id::CorrelationId;
use crate::database::models::ActionMeta;

/// Client details recorded alongside every mutating action.
#[derive(Clone, Debug)]
pub struct RequestInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub method: String,
    pub route: String,
    pub correlation_id: Option<String>,
}

impl RequestInfo {
    fn from_http(req: &HttpRequest) -> Self {
        RequestInfo {
            user_agent: req
                .headers()
                .get("user-agent")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string),
            ip_address: req.connection_info().realip_remote_addr().map(str::to_string),
            method: req.method().to_string(),
            route: req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string()),
            correlation_id: req
                .extensions()
                .get::<CorrelationId>()
                .map(|c| c.0.clone()),
        }
    }
}

impl From<RequestInfo> for ActionMeta {
    fn from(info: RequestInfo) -> Self {
        ActionMeta {
            ip: info.ip_address,
            user_agent: info.user_agent,
            route: info.route,
            correlation_id: info.correlation_id,
        }
    }
}

impl FromRequest for RequestInfo {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Prefer the copy captured by the middleware, fall back to the raw request
        let cached = req.extensions().get::<RequestInfo>().cloned();
        let info = cached.unwrap_or_else(|| RequestInfo::from_http(req));
        ready(Ok(info))
    }
}

// Middleware factory
pub struct RequestInfoMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestInfoMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestInfoMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestInfoMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestInfoMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestInfoMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let request_info = RequestInfo::from_http(req.request());
            req.extensions_mut().insert(request_info);

            service.call(req).await
        })
    }
}
