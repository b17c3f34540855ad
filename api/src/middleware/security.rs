//! Security middleware for enforcing HTTPS and response security headers.
//!
//! - HTTPS enforcement in production
//! - HSTS, nosniff, frame and referrer headers on every response

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorForbidden,
    http::header::{self, HeaderValue},
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use pv_shared::{Environment, ServerConfig};

/// Security middleware factory
#[derive(Debug, Clone, Copy)]
pub struct SecurityMiddleware {
    /// Reject plain-HTTP requests
    enforce_https: bool,
    add_security_headers: bool,
    /// Honour `X-Forwarded-Proto` from a terminating proxy
    trust_proxy_headers: bool,
}

impl SecurityMiddleware {
    /// HTTPS is enforced in production only; headers are always added
    pub fn new(environment: Environment, server: &ServerConfig) -> Self {
        let middleware = Self {
            enforce_https: environment.is_production(),
            add_security_headers: true,
            trust_proxy_headers: server.trust_proxy_headers,
        };
        tracing::info!(
            enforce_https = middleware.enforce_https,
            trust_proxy_headers = middleware.trust_proxy_headers,
            "Security middleware configured"
        );
        middleware
    }

    /// No HTTPS enforcement, headers only
    pub fn headers_only() -> Self {
        Self {
            enforce_https: false,
            add_security_headers: true,
            trust_proxy_headers: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityMiddlewareService {
            service: Rc::new(service),
            settings: *self,
        }))
    }
}

pub struct SecurityMiddlewareService<S> {
    service: Rc<S>,
    settings: SecurityMiddleware,
}

impl<S, B> Service<ServiceRequest> for SecurityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let settings = self.settings;

        Box::pin(async move {
            if settings.enforce_https && !is_secure_request(&req, settings.trust_proxy_headers) {
                tracing::warn!(
                    method = %req.method(),
                    path = req.path(),
                    "Insecure request blocked"
                );
                return Err(ErrorForbidden("HTTPS required"));
            }

            let mut response = service.call(req).await?;
            if settings.add_security_headers {
                add_security_response_headers(&mut response);
            }
            Ok(response)
        })
    }
}

/// HTTPS directly, via a trusted proxy, or from loopback
fn is_secure_request(req: &ServiceRequest, trust_proxy_headers: bool) -> bool {
    let conn_info = req.connection_info();
    if conn_info.scheme() == "https" {
        return true;
    }

    if trust_proxy_headers {
        let forwarded_https = req
            .headers()
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .map(|proto| proto.eq_ignore_ascii_case("https"))
            .unwrap_or(false);
        if forwarded_https {
            return true;
        }
    }

    let host = conn_info.host();
    host == "localhost" || host.starts_with("localhost:") || host.starts_with("127.0.0.1")
}

fn add_security_response_headers<B>(response: &mut ServiceResponse<B>) {
    let headers = response.headers_mut();

    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none';"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_headers_added() {
        let app = test::init_service(
            App::new()
                .wrap(SecurityMiddleware::headers_only())
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
    }

    #[actix_web::test]
    async fn test_production_rejects_plain_http_from_remote_host() {
        let middleware = SecurityMiddleware::new(Environment::Production, &ServerConfig::default());
        let app = test::init_service(
            App::new()
                .wrap(middleware)
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::HOST, "api.example.jp"))
            .to_request();
        let result = test::try_call_service(&app, req).await;
        assert!(result.is_err());

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::HOST, "api.example.jp"))
            .insert_header(("x-forwarded-proto", "https"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
