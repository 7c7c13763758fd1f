//! Optional Prometheus metrics for the telehealth routes.
//!
//! Requests are labelled by route pattern (`/atendimento/{state}/{city}`),
//! never by raw path, so landing pages for every city share one series.
//! Paths no route matches collapse into [`UNMATCHED_ENDPOINT`]. Health checks and
//! API docs are left out of the counters.
//!
//! [`MetricsLayer`] lets `create_server` wrap every worker's app with one
//! middleware type whether or not a registry was configured.

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Metric namespace, e.g. `telesaude_http_requests_total`.
const NAMESPACE: &str = "telesaude";
/// Scrape endpoint served by the middleware.
pub(crate) const METRICS_ENDPOINT: &str = "/metrics";
/// Endpoint label for requests that matched no route.
pub(crate) const UNMATCHED_ENDPOINT: &str = "UNMATCHED";
/// Routes kept out of the request counters.
const EXCLUDED_PATHS: [&str; 3] = ["/health/ready", "/health/live", METRICS_ENDPOINT];

/// Build the registry, or `None` (logged) when Prometheus rejects it.
pub(crate) fn telehealth_metrics() -> Option<PrometheusMetrics> {
    let labels = HashMap::from([("service".to_owned(), NAMESPACE.to_owned())]);
    let builder = EXCLUDED_PATHS.into_iter().fold(
        PrometheusMetricsBuilder::new(NAMESPACE)
            .endpoint(METRICS_ENDPOINT)
            .const_labels(labels)
            .mask_unmatched_patterns(UNMATCHED_ENDPOINT)
            .exclude_regex("^/docs"),
        |builder, path| builder.exclude(path),
    );
    match builder.build() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "Prometheus metrics disabled");
            None
        }
    }
}

/// Prometheus middleware, or a pass-through that only boxes the body.
#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        match metrics {
            Some(metrics) => Self::Enabled(Arc::new(metrics)),
            None => Self::Disabled,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            MetricsLayer::Enabled(metrics) => {
                let fut = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move {
                    let svc = fut.await?;
                    Ok(boxed::service(svc))
                })
            }
            MetricsLayer::Disabled => Box::pin(async move {
                let svc = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(svc))
            }),
        }
    }
}
