//! Composite aggregate endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use common::ItemId;
use composite::{
    AggregationOrchestrator, ProductService, RecommendationService, ReviewService,
    WritePropagator,
};
use domain::{CreateAggregateRequest, ProductAggregate};
use event_bus::EventTransport;

use crate::error::{ApiError, ErrorResponse};

/// Shared application state accessible from all handlers.
pub struct AppState<P, R, V, Tr>
where
    P: ProductService,
    R: RecommendationService,
    V: ReviewService,
    Tr: EventTransport,
{
    pub orchestrator: AggregationOrchestrator<P, R, V>,
    pub propagator: WritePropagator<Tr>,
}

impl<P, R, V, Tr> AppState<P, R, V, Tr>
where
    P: ProductService,
    R: RecommendationService,
    V: ReviewService,
    Tr: EventTransport,
{
    pub fn new(
        orchestrator: AggregationOrchestrator<P, R, V>,
        propagator: WritePropagator<Tr>,
    ) -> Self {
        Self {
            orchestrator,
            propagator,
        }
    }
}

/// Parses a path segment into a valid item id.
///
/// Non-integers are a malformed request; integers below 1 are invalid input.
fn parse_item_id(raw: &str) -> Result<ItemId, ApiError> {
    let value: i64 = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Type mismatch: itemId '{raw}' is not a number")))?;
    Ok(ItemId::new(value)?)
}

/// GET /aggregate/{item_id}: composite view of one product.
#[tracing::instrument(skip(state, uri))]
pub async fn get<P, R, V, Tr>(
    State(state): State<Arc<AppState<P, R, V, Tr>>>,
    uri: Uri,
    Path(item_id): Path<String>,
) -> Result<Json<ProductAggregate>, ErrorResponse>
where
    P: ProductService + 'static,
    R: RecommendationService + 'static,
    V: ReviewService + 'static,
    Tr: EventTransport + 'static,
{
    let item_id = parse_item_id(&item_id).map_err(|e| e.at(uri.path()))?;
    tracing::debug!(%item_id, "will get composite product info");

    let aggregate = state
        .orchestrator
        .get_aggregate(item_id)
        .await
        .map_err(|e| ApiError::from(e).at(uri.path()))?;
    Ok(Json(aggregate))
}

/// POST /aggregate: fan a create request out as change events.
#[tracing::instrument(skip(state, uri, payload))]
pub async fn create<P, R, V, Tr>(
    State(state): State<Arc<AppState<P, R, V, Tr>>>,
    uri: Uri,
    payload: Result<Json<CreateAggregateRequest>, JsonRejection>,
) -> Result<StatusCode, ErrorResponse>
where
    P: ProductService + 'static,
    R: RecommendationService + 'static,
    V: ReviewService + 'static,
    Tr: EventTransport + 'static,
{
    let Json(request) = payload.map_err(|rejection| {
        ApiError::BadRequest(rejection.body_text()).at(uri.path())
    })?;

    state
        .propagator
        .propagate_create(request)
        .await
        .map_err(|e| ApiError::from(e).at(uri.path()))?;

    metrics::counter!("composite_writes_total", "operation" => "create").increment(1);
    Ok(StatusCode::ACCEPTED)
}

/// DELETE /aggregate/{item_id}: emit deletes for the product and its children.
#[tracing::instrument(skip(state, uri))]
pub async fn delete<P, R, V, Tr>(
    State(state): State<Arc<AppState<P, R, V, Tr>>>,
    uri: Uri,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ErrorResponse>
where
    P: ProductService + 'static,
    R: RecommendationService + 'static,
    V: ReviewService + 'static,
    Tr: EventTransport + 'static,
{
    let item_id = parse_item_id(&item_id).map_err(|e| e.at(uri.path()))?;

    state
        .propagator
        .propagate_delete(item_id)
        .await
        .map_err(|e| ApiError::from(e).at(uri.path()))?;

    metrics::counter!("composite_writes_total", "operation" => "delete").increment(1);
    Ok(StatusCode::ACCEPTED)
}
