use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{error::InternalError, web, Error, HttpMessage, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::utils::auth::{decode_jwt, Claims};
use crate::utils::config::Config;

/// Bearer-token middleware for login-gated routes. On success the decoded
/// [`Claims`] are inserted into request extensions so handlers can take them
/// via `web::ReqData<Claims>`. Failures produce a JSON `{"error": ...}` body
/// with status 401.
pub struct JwtMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        match authenticate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(async move { service.call(req).await })
            }
            Err(message) => Box::pin(ready(Err(unauthorized(message)))),
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<Claims, &'static str> {
    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or("Server configuration missing")?;

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or("Authentication required")?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or("Invalid authorization format")?;

    decode_jwt(token, &config.jwt_secret).map_err(|_| "Invalid or expired token")
}

fn unauthorized(message: &'static str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({ "error": message }));
    InternalError::from_response(message, response).into()
}
