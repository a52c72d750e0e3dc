#![allow(dead_code)]
use utoipa::OpenApi;

use crate::handlers::EstimateRequest;
use crate::logic::FareEstimate;

#[utoipa::path(
    post,
    path = "/price/estimate",
    request_body(content = EstimateRequest, example = json!({
        "from": "MG Road, Bengaluru",
        "to": { "address": "Kempegowda International Airport" }
    })),
    responses(
        (status = 200, description = "Fare estimate", body = FareEstimate,
         example = json!({
             "distanceMeters": 35400,
             "durationSeconds": 3120,
             "price": 150,
             "currency": "INR"
         })
        ),
        (status = 400, description = "Bad Request"),
        (status = 422, description = "No route between the places"),
        (status = 502, description = "Routing provider failure")
    ),
    tag = "Pricing"
)]
fn doc_estimate_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_estimate_handler),
    components(schemas(EstimateRequest, FareEstimate)),
    tags(
        (name = "Pricing", description = "Distance-based fare estimation API")
    ),
    servers(
        (url = "/", description = "Pricing API server")
    )
)]
pub struct PricingApiDoc;
