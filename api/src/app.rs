//! Application state and factory
//!
//! Builds the actix-web application around an [`OtpService`] so the binary
//! and the tests share one route table.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use tracing_actix_web::TracingLogger;

use pv_core::repositories::PersistentStore;
use pv_core::services::otp::{OtpService, SmsGatewayTrait};
use pv_core::services::phone::PhoneLookupTrait;
use pv_shared::AppConfig;

use crate::handlers::json_error_handler;
use crate::middleware::{create_cors, SecurityMiddleware};
use crate::routes::health::{api_index, health_check, not_found};
use crate::routes::verification::{send_code, verify_code};

/// Application state that holds shared services
pub struct AppState<P, S, L>
where
    P: PersistentStore + 'static,
    S: SmsGatewayTrait,
    L: PhoneLookupTrait,
{
    pub otp_service: Arc<OtpService<P, S, L>>,
    pub config: Arc<AppConfig>,
}

impl<P, S, L> AppState<P, S, L>
where
    P: PersistentStore + 'static,
    S: SmsGatewayTrait,
    L: PhoneLookupTrait,
{
    pub fn new(otp_service: Arc<OtpService<P, S, L>>, config: AppConfig) -> Self {
        Self {
            otp_service,
            config: Arc::new(config),
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<P, S, L>(
    app_state: web::Data<AppState<P, S, L>>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    P: PersistentStore + 'static,
    S: SmsGatewayTrait + 'static,
    L: PhoneLookupTrait + 'static,
{
    let config = Arc::clone(&app_state.config);
    let cors = create_cors(&config.server.cors, config.environment);
    let security = SecurityMiddleware::new(config.environment, &config.server);
    let json_config = web::JsonConfig::default()
        .limit(config.server.max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(app_state)
        .app_data(json_config)
        // Last wrap runs first: tracing, then CORS, then security
        .wrap(security)
        .wrap(cors)
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/verification")
                        .route("/send", web::post().to(send_code::<P, S, L>))
                        .route("/verify", web::post().to(verify_code::<P, S, L>)),
                )
                .route("/", web::get().to(api_index)),
        )
        .default_service(web::route().to(not_found))
}
