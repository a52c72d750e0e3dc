mod collaborators;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use rideflow_common::services::NotificationFanout;
use rideflow_config::load_config;
use rideflow_db::repositories::{DeviceRegistrationRepository, RideRepository};
use rideflow_db::{
    DbClient, DeviceRegistrationRepositoryFactory, RepositoryFactory, RideRepositoryFactory,
};
use rideflow_notify::{FanoutService, FcmClient, NotifyState};
use rideflow_pricing::{FarePricer, FareService, GoogleRoutingClient, PricingState};
use rideflow_ride::RideEngine;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use collaborators::{DisabledFanout, DisabledPricer};

/// Liveness plus a round-trip to the database.
async fn health_handler(State(db): State<DbClient>) -> impl IntoResponse {
    let database = db.is_healthy().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(json!({ "status": "ok", "database": database })))
}

#[tokio::main]
async fn main() {
    rideflow_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));

    let db = DbClient::new(&config)
        .await
        .expect("Failed to connect to the database");

    let ride_repo = RideRepositoryFactory::new().create_repository(db.clone());
    let device_repo = DeviceRegistrationRepositoryFactory::new().create_repository(db.clone());

    ride_repo
        .init_schema()
        .await
        .expect("Failed to initialize ride schema");
    device_repo
        .init_schema()
        .await
        .expect("Failed to initialize device registration schema");

    let fanout: Arc<dyn NotificationFanout> = match (&config.firebase, config.use_notifications) {
        (Some(firebase), true) => {
            info!("Initializing FCM fan-out");
            let sender = Arc::new(FcmClient::new(firebase.clone()));
            Arc::new(FanoutService::new(sender, device_repo.clone()))
        }
        _ => {
            warn!("Push notifications disabled; fan-out is a no-op");
            Arc::new(DisabledFanout)
        }
    };

    let pricer: Arc<dyn FarePricer> = match (&config.routing, config.use_pricing) {
        (Some(routing), true) => {
            info!("Initializing routing provider for fare quotes");
            let provider = Arc::new(GoogleRoutingClient::new(routing.clone()));
            Arc::new(FareService::new(provider))
        }
        _ => {
            warn!("Pricing disabled; rides must carry a client-supplied price");
            Arc::new(DisabledPricer)
        }
    };

    let engine = Arc::new(RideEngine::new(ride_repo, fanout.clone(), pricer.clone()));

    let notify_state = Arc::new(NotifyState {
        devices: device_repo,
        fanout,
    });
    let pricing_state = Arc::new(PricingState { pricer });

    let core_router = Router::new()
        .route("/", get(|| async { "Welcome to the Rideflow API!" }))
        .route("/health", get(health_handler))
        .with_state(db);

    #[allow(unused_mut)]
    let mut app = core_router
        .merge(rideflow_ride::routes(engine))
        .merge(rideflow_notify::routes(notify_state))
        .merge(rideflow_pricing::routes(pricing_state));

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use rideflow_notify::doc::NotifyApiDoc;
        use rideflow_pricing::doc::PricingApiDoc;
        use rideflow_ride::doc::RideApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        // Define the merged OpenAPI documentation struct
        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Rideflow API",
                version = "0.1.0",
                description = "Ride dispatch service API docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Rideflow", description = "Ride dispatch service endpoints")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(RideApiDoc::openapi());
        openapi_doc.merge(NotifyApiDoc::openapi());
        openapi_doc.merge(PricingApiDoc::openapi());
        info!("Adding Swagger UI at /docs");

        let swagger_ui = SwaggerUi::new("/docs").url("/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
