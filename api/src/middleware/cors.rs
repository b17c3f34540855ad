//! CORS configuration for browser and mobile clients.
//!
//! Development accepts any origin when none are configured. Outside
//! development only the configured origins are accepted.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use pv_shared::{CorsConfig, Environment};

/// Headers clients send to the verification endpoints
fn client_headers() -> Vec<header::HeaderName> {
    vec![
        header::ACCEPT,
        header::ACCEPT_LANGUAGE,
        header::CONTENT_TYPE,
        header::USER_AGENT,
        header::HeaderName::from_static("x-session-id"),
        header::HeaderName::from_static("x-device-fingerprint"),
        header::HeaderName::from_static("x-captcha-token"),
        header::HeaderName::from_static("x-requested-with"),
    ]
}

/// Creates the CORS middleware for `environment`.
pub fn create_cors(config: &CorsConfig, environment: Environment) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(client_headers())
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(config.max_age);

    if config.allowed_origins.is_empty() {
        if environment.is_development() {
            tracing::info!("CORS allows any origin in development");
            cors = cors.allow_any_origin();
        } else {
            tracing::warn!(
                environment = %environment,
                "No CORS origins configured, cross-origin requests will be rejected"
            );
        }
        return cors;
    }

    for origin in config.allowed_origins.iter().map(|o| o.trim()) {
        if !origin.is_empty() {
            tracing::info!(origin = origin, "Adding allowed CORS origin");
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn preflight(cors: Cors, origin: &str) -> actix_web::http::StatusCode {
        let app = test::init_service(
            App::new()
                .wrap(cors)
                .route("/ping", web::post().to(HttpResponse::Ok)),
        )
        .await;
        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/ping")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        test::call_service(&app, req).await.status()
    }

    #[actix_web::test]
    async fn test_development_allows_any_origin() {
        let cors = create_cors(&CorsConfig::default(), Environment::Development);
        assert!(preflight(cors, "https://anything.example").await.is_success());
    }

    #[actix_web::test]
    async fn test_configured_origins_only() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example.jp".to_string()],
            max_age: 600,
        };

        let cors = create_cors(&config, Environment::Production);
        assert!(preflight(cors, "https://app.example.jp").await.is_success());

        let cors = create_cors(&config, Environment::Production);
        assert!(!preflight(cors, "https://evil.example").await.is_success());
    }
}
