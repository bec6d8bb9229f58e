//! Internal template resolution endpoint
//!
//! The rendering layer asks the edge which component serves a path for
//! a tenant's template instead of re-implementing binding lookup. The
//! endpoint is read-only and answers 200 for every well-formed query;
//! "this template cannot serve that path" is payload, not an error.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use portico_core::{TenantDirectory, TenantSite, resolve_tenant};
use portico_ingress::{IngressError, IngressResult};
use portico_observability::Metrics;
use portico_templates::{ResolvedPage, TemplateRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct ResolutionState {
    pub directory: Arc<dyn TenantDirectory>,
    pub registry: &'static TemplateRegistry,
    pub metrics: Option<Arc<Metrics>>,
}

#[derive(Debug, Deserialize)]
struct ResolutionQuery {
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

/// What the rendering layer gets back. `template` names the binding
/// actually used, baseline fallback included, so unknown template
/// names surface here as `meridian` rather than as an error.
#[derive(Debug, Serialize)]
struct ResolutionResponse {
    domain: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant: Option<TenantSite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<ResolvedPage>,
    resolved: bool,
}

pub fn router(state: ResolutionState) -> Router {
    Router::new()
        .route("/api/internal/template-resolution", get(resolve_page))
        .with_state(state)
}

async fn resolve_page(
    State(state): State<ResolutionState>,
    Query(query): Query<ResolutionQuery>,
) -> IngressResult<Json<ResolutionResponse>> {
    let domain = query
        .domain
        .filter(|d| !d.is_empty())
        .ok_or_else(|| IngressError::InvalidRequest("missing query parameter: domain".to_string()))?;
    let path = query
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| IngressError::InvalidRequest("missing query parameter: path".to_string()))?;

    let tenant = resolve_tenant(state.directory.as_ref(), &domain).await;

    let (template, page) = match &tenant {
        Some(site) => {
            let template = state
                .registry
                .binding_for(site)
                .map(|binding| binding.name().to_string());
            let page = state.registry.resolve(&path, site);
            if let (Some(metrics), Some(template)) = (&state.metrics, &template) {
                metrics.record_template_resolution(template, page.is_some());
            }
            (template, page)
        }
        None => (None, None),
    };

    let resolved = page.is_some();
    debug!(domain = %domain, path = %path, resolved, "template resolution query");

    Ok(Json(ResolutionResponse {
        domain,
        path,
        tenant,
        template,
        page,
        resolved,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use portico_core::{Result, SiteArchetype};
    use tower::ServiceExt;

    struct StaticDirectory {
        site: Option<TenantSite>,
    }

    #[async_trait]
    impl TenantDirectory for StaticDirectory {
        async fn lookup(&self, _domain: &str) -> Result<Option<TenantSite>> {
            Ok(self.site.clone())
        }
    }

    fn app(site: Option<TenantSite>) -> Router {
        app_with_metrics(site, None)
    }

    fn app_with_metrics(site: Option<TenantSite>, metrics: Option<Arc<Metrics>>) -> Router {
        router(ResolutionState {
            directory: Arc::new(StaticDirectory { site }),
            registry: TemplateRegistry::shared(),
            metrics,
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn resolves_a_page_for_a_known_tenant() {
        let site = TenantSite::new("harborside.test", "Harborside", SiteArchetype::Directory)
            .with_template("harbor");
        let (status, body) = get_json(
            app(Some(site)),
            "/api/internal/template-resolution?domain=harborside.test&path=/businesses/pier-bakery",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resolved"], true);
        assert_eq!(body["template"], "harbor");
        assert_eq!(body["page"]["component_id"], "HarborBusinessDetail");
        assert_eq!(body["page"]["page_key"], "business-detail");
        assert_eq!(body["tenant"]["domain"], "harborside.test");
    }

    #[tokio::test]
    async fn unknown_template_name_resolves_through_the_baseline() {
        let site = TenantSite::new("harborside.test", "Harborside", SiteArchetype::Directory)
            .with_template("no-such-template");
        let (status, body) = get_json(
            app(Some(site)),
            "/api/internal/template-resolution?domain=harborside.test&path=/about",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "meridian");
        assert_eq!(body["page"]["component_id"], "MeridianAbout");
    }

    #[tokio::test]
    async fn unsupported_path_reports_the_template_without_a_page() {
        let site = TenantSite::new("launch.test", "Launch", SiteArchetype::Landing)
            .with_template("launchpad");
        let (status, body) = get_json(
            app(Some(site)),
            "/api/internal/template-resolution?domain=launch.test&path=/pricing",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resolved"], false);
        assert_eq!(body["template"], "launchpad");
        assert!(body.get("page").is_none());
    }

    #[tokio::test]
    async fn unknown_domain_resolves_nothing() {
        let (status, body) = get_json(
            app(None),
            "/api/internal/template-resolution?domain=unknown.test&path=/about",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resolved"], false);
        assert!(body.get("tenant").is_none());
        assert!(body.get("template").is_none());
        assert!(body.get("page").is_none());
    }

    #[tokio::test]
    async fn missing_domain_is_rejected() {
        let (status, body) =
            get_json(app(None), "/api/internal/template-resolution?path=/about").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request");
    }

    #[tokio::test]
    async fn missing_path_is_rejected() {
        let (status, body) = get_json(
            app(None),
            "/api/internal/template-resolution?domain=example.com",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request");
    }

    #[tokio::test]
    async fn resolutions_are_counted_per_template() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let site = TenantSite::new("launch.test", "Launch", SiteArchetype::Landing)
            .with_template("launchpad");

        let app = app_with_metrics(Some(site), Some(metrics.clone()));
        let (_, _) = get_json(
            app.clone(),
            "/api/internal/template-resolution?domain=launch.test&path=/about",
        )
        .await;
        let (_, _) = get_json(
            app,
            "/api/internal/template-resolution?domain=launch.test&path=/pricing",
        )
        .await;

        assert_eq!(
            metrics
                .template_resolutions_total
                .with_label_values(&["launchpad", "resolved"])
                .get(),
            1.0
        );
        assert_eq!(
            metrics
                .template_resolutions_total
                .with_label_values(&["launchpad", "unsupported"])
                .get(),
            1.0
        );
    }
}
