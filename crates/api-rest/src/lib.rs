//! # API REST
//!
//! REST API for managing scope rules.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! The router is built here so the standalone binary, the workspace's main binary and tests all
//! serve the same routes.

#![warn(rust_2018_idioms)]

mod views;

use axum::{
    extract::{Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    AddConditionRes, AddScopeReq, AddScopeRes, AddTagsReq, AddTagsRes, CatalogRes,
    CreateRuleSetReq, HealthRes, HealthService, ListRuleSetsRes, RemoveTagRes, ResolveReq,
    ResolveRes, RuleSetRes, RuleSetSummary, SetRoleReq,
};
use permissions_core::{
    find_matching_option, ConditionId, EntitlementService, Product, Role, RuleError, RuleSetId,
    ScopeId, ScopeType, SectionKey,
};
use scope_wire::RuleBookFile;

/// Error shape returned by every handler.
type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub entitlements: EntitlementService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_catalog,
        resolve_tag,
        list_rule_sets,
        create_rule_set,
        import_rule_set,
        get_rule_set,
        delete_rule_set,
        set_role,
        save_rule_set,
        discard_rule_set,
        export_rule_set,
        add_scope,
        add_condition,
        remove_condition,
        remove_scope,
        add_tags,
        remove_tag,
    ),
    components(schemas(
        HealthRes,
        CatalogRes,
        ResolveReq,
        ResolveRes,
        CreateRuleSetReq,
        RuleSetSummary,
        ListRuleSetsRes,
        RuleSetRes,
        api_shared::SectionView,
        api_shared::ConditionView,
        api_shared::ScopeView,
        SetRoleReq,
        AddScopeReq,
        AddScopeRes,
        AddConditionRes,
        AddTagsReq,
        AddTagsRes,
        RemoveTagRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog/:scope_type", get(get_catalog))
        .route("/resolve", post(resolve_tag))
        .route("/rule-sets", get(list_rule_sets).post(create_rule_set))
        .route("/rule-sets/import/:name", post(import_rule_set))
        .route("/rule-sets/:id", get(get_rule_set).delete(delete_rule_set))
        .route("/rule-sets/:id/role", put(set_role))
        .route("/rule-sets/:id/save", post(save_rule_set))
        .route("/rule-sets/:id/discard", post(discard_rule_set))
        .route("/rule-sets/:id/export", get(export_rule_set))
        .route("/rule-sets/:id/sections/:section/scopes", post(add_scope))
        .route(
            "/rule-sets/:id/sections/:section/conditions",
            post(add_condition),
        )
        .route(
            "/rule-sets/:id/sections/:section/conditions/:condition_id",
            delete(remove_condition),
        )
        .route(
            "/rule-sets/:id/sections/:section/conditions/:condition_id/scopes/:scope_id",
            delete(remove_scope),
        )
        .route(
            "/rule-sets/:id/sections/:section/conditions/:condition_id/scopes/:scope_id/tags",
            post(add_tags),
        )
        .route(
            "/rule-sets/:id/sections/:section/conditions/:condition_id/scopes/:scope_id/tags/:index",
            delete(remove_tag),
        )
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a core error to a status code, logging the detail.
fn map_rule_error(context: &str, err: RuleError) -> ApiError {
    match err {
        RuleError::RuleSetNotFound(_)
        | RuleError::ConditionNotFound(_)
        | RuleError::ScopeNotFound { .. }
        | RuleError::SectionNotInProduct { .. }
        | RuleError::UnknownSection(_) => {
            tracing::warn!("{context}: {err}");
            (StatusCode::NOT_FOUND, "Not found")
        }
        RuleError::LockPoisoned => {
            tracing::error!("{context}: {err:?}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
        other => {
            tracing::warn!("{context}: {other}");
            (StatusCode::BAD_REQUEST, "Bad request")
        }
    }
}

fn parse_rule_set_id(id: &str) -> Result<RuleSetId, ApiError> {
    RuleSetId::parse(id).map_err(|e| {
        tracing::warn!("Invalid rule set id: {e}");
        (StatusCode::BAD_REQUEST, "Invalid rule set id")
    })
}

fn parse_section(section: &str) -> Result<SectionKey, ApiError> {
    section
        .parse()
        .map_err(|e| map_rule_error("Parse section", e))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/catalog/{scope_type}",
    params(("scope_type" = String, Path, description = "Scope type label, e.g. `States`")),
    responses(
        (status = 200, description = "Candidate values; empty for an unrecognised scope type", body = CatalogRes)
    )
)]
/// Candidate values for a scope type.
#[axum::debug_handler]
async fn get_catalog(
    State(state): State<AppState>,
    AxumPath(scope_type): AxumPath<String>,
) -> Json<CatalogRes> {
    let options = state
        .entitlements
        .catalog()
        .options_for_label(&scope_type)
        .to_vec();
    Json(CatalogRes {
        scope_type,
        options,
    })
}

#[utoipa::path(
    post,
    path = "/resolve",
    request_body = ResolveReq,
    responses(
        (status = 200, description = "Resolved tag", body = ResolveRes),
        (status = 400, description = "Unknown scope type")
    )
)]
/// Resolves free text to a tag without storing it.
#[axum::debug_handler]
async fn resolve_tag(
    State(state): State<AppState>,
    Json(req): Json<ResolveReq>,
) -> Result<Json<ResolveRes>, ApiError> {
    let scope_type: ScopeType = req
        .scope_type
        .parse()
        .map_err(|e| map_rule_error("Resolve tag", e))?;
    let tag = find_matching_option(state.entitlements.catalog(), scope_type, &req.input);
    Ok(Json(ResolveRes { tag }))
}

#[utoipa::path(
    get,
    path = "/rule-sets",
    responses(
        (status = 200, description = "All rule sets", body = ListRuleSetsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn list_rule_sets(State(state): State<AppState>) -> Result<Json<ListRuleSetsRes>, ApiError> {
    let rule_sets = state
        .entitlements
        .list()
        .map_err(|e| map_rule_error("List rule sets", e))?;
    Ok(Json(ListRuleSetsRes {
        rule_sets: rule_sets.iter().map(views::summary).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/rule-sets",
    request_body = CreateRuleSetReq,
    responses(
        (status = 201, description = "Rule set created", body = RuleSetRes),
        (status = 400, description = "Bad request")
    )
)]
/// Creates an empty rule set for a product.
#[axum::debug_handler]
async fn create_rule_set(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleSetReq>,
) -> Result<(StatusCode, Json<RuleSetRes>), ApiError> {
    let product: Product = req
        .product
        .parse()
        .map_err(|e| map_rule_error("Create rule set", e))?;
    let created = state
        .entitlements
        .create(&req.name, product)
        .map_err(|e| map_rule_error("Create rule set", e))?;
    Ok((StatusCode::CREATED, Json(views::rule_set(&created))))
}

#[utoipa::path(
    post,
    path = "/rule-sets/import/{name}",
    params(("name" = String, Path, description = "Name for the imported rule set")),
    request_body(content = String, content_type = "application/yaml"),
    responses(
        (status = 201, description = "Rule set imported", body = RuleSetRes),
        (status = 400, description = "Invalid rule book YAML")
    )
)]
/// Imports a rule book in YAML form as a new, already saved rule set.
#[axum::debug_handler]
async fn import_rule_set(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
    body: String,
) -> Result<(StatusCode, Json<RuleSetRes>), ApiError> {
    let book = RuleBookFile::parse(&body).map_err(|e| {
        tracing::warn!("Import rule set: {e}");
        (StatusCode::BAD_REQUEST, "Invalid rule book")
    })?;
    let imported = state
        .entitlements
        .import(&name, book)
        .map_err(|e| map_rule_error("Import rule set", e))?;
    Ok((StatusCode::CREATED, Json(views::rule_set(&imported))))
}

#[utoipa::path(
    get,
    path = "/rule-sets/{id}",
    params(("id" = String, Path, description = "Rule set id (32 lowercase hex)")),
    responses(
        (status = 200, description = "Rule set with working copy", body = RuleSetRes),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn get_rule_set(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<RuleSetRes>, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let rule_set = state
        .entitlements
        .get(id)
        .map_err(|e| map_rule_error("Get rule set", e))?;
    Ok(Json(views::rule_set(&rule_set)))
}

#[utoipa::path(
    delete,
    path = "/rule-sets/{id}",
    params(("id" = String, Path, description = "Rule set id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn delete_rule_set(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_rule_set_id(&id)?;
    state
        .entitlements
        .delete(id)
        .map_err(|e| map_rule_error("Delete rule set", e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/rule-sets/{id}/role",
    params(("id" = String, Path, description = "Rule set id")),
    request_body = SetRoleReq,
    responses(
        (status = 200, description = "Role updated", body = RuleSetSummary),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn set_role(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<SetRoleReq>,
) -> Result<Json<RuleSetSummary>, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let role = req
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|e| map_rule_error("Set role", e))?;
    let entitlements = &state.entitlements;
    entitlements
        .set_role(id, role)
        .and_then(|()| entitlements.get(id))
        .map(|r| Json(views::summary(&r)))
        .map_err(|e| map_rule_error("Set role", e))
}

#[utoipa::path(
    post,
    path = "/rule-sets/{id}/save",
    params(("id" = String, Path, description = "Rule set id")),
    responses(
        (status = 200, description = "Working copy saved", body = RuleSetSummary),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn save_rule_set(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<RuleSetSummary>, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let saved = state
        .entitlements
        .save(id)
        .map_err(|e| map_rule_error("Save rule set", e))?;
    Ok(Json(views::summary(&saved)))
}

#[utoipa::path(
    post,
    path = "/rule-sets/{id}/discard",
    params(("id" = String, Path, description = "Rule set id")),
    responses(
        (status = 200, description = "Unsaved changes discarded", body = RuleSetRes),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn discard_rule_set(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<RuleSetRes>, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let restored = state
        .entitlements
        .discard(id)
        .map_err(|e| map_rule_error("Discard rule set", e))?;
    Ok(Json(views::rule_set(&restored)))
}

#[utoipa::path(
    get,
    path = "/rule-sets/{id}/export",
    params(("id" = String, Path, description = "Rule set id")),
    responses(
        (status = 200, description = "Working copy as rule book YAML", body = String, content_type = "application/yaml"),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn export_rule_set(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let rule_set = state
        .entitlements
        .get(id)
        .map_err(|e| map_rule_error("Export rule set", e))?;
    let yaml = RuleBookFile::render(rule_set.current()).map_err(|e| {
        tracing::error!("Export rule set error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;
    Ok(([(header::CONTENT_TYPE, "application/yaml")], yaml))
}

#[utoipa::path(
    post,
    path = "/rule-sets/{id}/sections/{section}/scopes",
    params(
        ("id" = String, Path, description = "Rule set id"),
        ("section" = String, Path, description = "Section key, e.g. `clear` or `hospital`")
    ),
    request_body = AddScopeReq,
    responses(
        (status = 201, description = "Scope added", body = AddScopeRes),
        (status = 400, description = "Scope type not offered for this product"),
        (status = 404, description = "Rule set, section or condition not found")
    )
)]
/// Adds an empty scope. Without `condition_id` the section is reset to one new condition.
#[axum::debug_handler]
async fn add_scope(
    State(state): State<AppState>,
    AxumPath((id, section)): AxumPath<(String, String)>,
    Json(req): Json<AddScopeReq>,
) -> Result<(StatusCode, Json<AddScopeRes>), ApiError> {
    let id = parse_rule_set_id(&id)?;
    let section = parse_section(&section)?;
    let scope_type: ScopeType = req
        .scope_type
        .parse()
        .map_err(|e| map_rule_error("Add scope", e))?;
    let condition_id = req.condition_id.map(ConditionId::from_raw);

    let (condition_id, scope_id) = state
        .entitlements
        .update(id, |_, book| {
            book.tree_mut(section)?.add_scope(condition_id, scope_type)
        })
        .map_err(|e| map_rule_error("Add scope", e))?;
    Ok((
        StatusCode::CREATED,
        Json(AddScopeRes {
            condition_id: condition_id.get(),
            scope_id: scope_id.get(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/rule-sets/{id}/sections/{section}/conditions",
    params(
        ("id" = String, Path, description = "Rule set id"),
        ("section" = String, Path, description = "Section key")
    ),
    responses(
        (status = 201, description = "Empty condition appended", body = AddConditionRes),
        (status = 404, description = "Rule set or section not found")
    )
)]
#[axum::debug_handler]
async fn add_condition(
    State(state): State<AppState>,
    AxumPath((id, section)): AxumPath<(String, String)>,
) -> Result<(StatusCode, Json<AddConditionRes>), ApiError> {
    let id = parse_rule_set_id(&id)?;
    let section = parse_section(&section)?;
    let condition_id = state
        .entitlements
        .update(id, |_, book| book.tree_mut(section)?.add_condition())
        .map_err(|e| map_rule_error("Add condition", e))?;
    Ok((
        StatusCode::CREATED,
        Json(AddConditionRes {
            condition_id: condition_id.get(),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/rule-sets/{id}/sections/{section}/conditions/{condition_id}",
    params(
        ("id" = String, Path, description = "Rule set id"),
        ("section" = String, Path, description = "Section key"),
        ("condition_id" = u64, Path, description = "Condition id")
    ),
    responses(
        (status = 204, description = "Condition removed"),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn remove_condition(
    State(state): State<AppState>,
    AxumPath((id, section, condition_id)): AxumPath<(String, String, u64)>,
) -> Result<StatusCode, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let section = parse_section(&section)?;
    state
        .entitlements
        .update(id, |_, book| {
            book.tree_mut(section)?
                .remove_condition(ConditionId::from_raw(condition_id))
        })
        .map_err(|e| map_rule_error("Remove condition", e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/rule-sets/{id}/sections/{section}/conditions/{condition_id}/scopes/{scope_id}",
    params(
        ("id" = String, Path, description = "Rule set id"),
        ("section" = String, Path, description = "Section key"),
        ("condition_id" = u64, Path, description = "Condition id"),
        ("scope_id" = u64, Path, description = "Scope id")
    ),
    responses(
        (status = 204, description = "Scope removed"),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn remove_scope(
    State(state): State<AppState>,
    AxumPath((id, section, condition_id, scope_id)): AxumPath<(String, String, u64, u64)>,
) -> Result<StatusCode, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let section = parse_section(&section)?;
    state
        .entitlements
        .update(id, |_, book| {
            book.tree_mut(section)?.remove_scope(
                ConditionId::from_raw(condition_id),
                ScopeId::from_raw(scope_id),
            )
        })
        .map_err(|e| map_rule_error("Remove scope", e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/rule-sets/{id}/sections/{section}/conditions/{condition_id}/scopes/{scope_id}/tags",
    params(
        ("id" = String, Path, description = "Rule set id"),
        ("section" = String, Path, description = "Section key"),
        ("condition_id" = u64, Path, description = "Condition id"),
        ("scope_id" = u64, Path, description = "Scope id")
    ),
    request_body = AddTagsReq,
    responses(
        (status = 200, description = "Tags resolved and appended", body = AddTagsRes),
        (status = 404, description = "Not found")
    )
)]
/// Adds comma-separated tags, resolving each against the catalog.
#[axum::debug_handler]
async fn add_tags(
    State(state): State<AppState>,
    AxumPath((id, section, condition_id, scope_id)): AxumPath<(String, String, u64, u64)>,
    Json(req): Json<AddTagsReq>,
) -> Result<Json<AddTagsRes>, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let section = parse_section(&section)?;
    let added = state
        .entitlements
        .update(id, |catalog, book| {
            book.tree_mut(section)?.add_tags_from_comma_separated(
                catalog,
                ConditionId::from_raw(condition_id),
                ScopeId::from_raw(scope_id),
                &req.input,
            )
        })
        .map_err(|e| map_rule_error("Add tags", e))?;
    Ok(Json(AddTagsRes { added }))
}

#[utoipa::path(
    delete,
    path = "/rule-sets/{id}/sections/{section}/conditions/{condition_id}/scopes/{scope_id}/tags/{index}",
    params(
        ("id" = String, Path, description = "Rule set id"),
        ("section" = String, Path, description = "Section key"),
        ("condition_id" = u64, Path, description = "Condition id"),
        ("scope_id" = u64, Path, description = "Scope id"),
        ("index" = usize, Path, description = "Zero-based tag position")
    ),
    responses(
        (status = 200, description = "Tag removed", body = RemoveTagRes),
        (status = 400, description = "Index out of range"),
        (status = 404, description = "Not found")
    )
)]
#[axum::debug_handler]
async fn remove_tag(
    State(state): State<AppState>,
    AxumPath((id, section, condition_id, scope_id, index)): AxumPath<(
        String,
        String,
        u64,
        u64,
        usize,
    )>,
) -> Result<Json<RemoveTagRes>, ApiError> {
    let id = parse_rule_set_id(&id)?;
    let section = parse_section(&section)?;
    let removed = state
        .entitlements
        .update(id, |_, book| {
            book.tree_mut(section)?.remove_tag(
                ConditionId::from_raw(condition_id),
                ScopeId::from_raw(scope_id),
                index,
            )
        })
        .map_err(|e| map_rule_error("Remove tag", e))?;
    Ok(Json(RemoveTagRes { removed }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use permissions_core::OptionCatalog;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Router, EntitlementService) {
        let entitlements = EntitlementService::new(Arc::new(OptionCatalog::builtin()));
        let router = router(AppState {
            entitlements: entitlements.clone(),
        });
        (router, entitlements)
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let (router, _) = app();
        let (status, body) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn catalog_for_unknown_type_is_empty() {
        let (router, _) = app();
        let (status, body) = send(&router, "GET", "/catalog/Zip%20Codes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["options"], serde_json::json!([]));

        let (_, body) = send(&router, "GET", "/catalog/States", None).await;
        assert!(body["options"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("Texas")));
    }

    #[tokio::test]
    async fn resolve_applies_catalog_casing() {
        let (router, _) = app();
        let (status, body) = send(
            &router,
            "POST",
            "/resolve",
            Some(serde_json::json!({"scope_type": "Billing Codes", "input": "hcpcs c9741"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tag"], "HCPCS C9741");

        let (status, _) = send(
            &router,
            "POST",
            "/resolve",
            Some(serde_json::json!({"scope_type": "Zip Codes", "input": "90210"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn build_save_and_discard_rule_set() {
        let (router, entitlements) = app();

        let (status, created) = send(
            &router,
            "POST",
            "/rule-sets",
            Some(serde_json::json!({"name": "Contracts team", "product": "clear_contracts"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["summary"]["id"].as_str().unwrap().to_string();

        let (status, scope) = send(
            &router,
            "POST",
            &format!("/rule-sets/{id}/sections/clear/scopes"),
            Some(serde_json::json!({"scope_type": "States"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let cid = scope["condition_id"].as_u64().unwrap();
        let sid = scope["scope_id"].as_u64().unwrap();

        let (status, added) = send(
            &router,
            "POST",
            &format!("/rule-sets/{id}/sections/clear/conditions/{cid}/scopes/{sid}/tags"),
            Some(serde_json::json!({"input": "California, california, Texas"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(added["added"], serde_json::json!(["California", "Texas"]));

        let (status, summary) =
            send(&router, "POST", &format!("/rule-sets/{id}/save"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["dirty"], false);

        let (status, removed) = send(
            &router,
            "DELETE",
            &format!("/rule-sets/{id}/sections/clear/conditions/{cid}/scopes/{sid}/tags/0"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed["removed"], "California");

        let (_, restored) = send(&router, "POST", &format!("/rule-sets/{id}/discard"), None).await;
        assert_eq!(
            restored["sections"][0]["conditions"][0]["scopes"][0]["tags"],
            serde_json::json!(["California", "Texas"])
        );

        let rule_set = entitlements.get(RuleSetId::parse(&id).unwrap()).unwrap();
        assert!(!rule_set.is_dirty());
    }

    #[tokio::test]
    async fn wrong_section_and_bad_ids_are_rejected() {
        let (router, _) = app();
        let (_, created) = send(
            &router,
            "POST",
            "/rule-sets",
            Some(serde_json::json!({"name": "MRF", "product": "mrf_search"})),
        )
        .await;
        let id = created["summary"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &router,
            "POST",
            &format!("/rule-sets/{id}/sections/clear/scopes"),
            Some(serde_json::json!({"scope_type": "State"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &router,
            "POST",
            &format!("/rule-sets/{id}/sections/hospital/scopes"),
            Some(serde_json::json!({"scope_type": "States"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&router, "GET", "/rule-sets/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = RuleSetId::new();
        let (status, _) = send(&router, "GET", &format!("/rule-sets/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn mrf_last_tag_removal_prunes_condition() {
        let (router, entitlements) = app();
        let (_, created) = send(
            &router,
            "POST",
            "/rule-sets",
            Some(serde_json::json!({"name": "MRF", "product": "mrf_search"})),
        )
        .await;
        let id = created["summary"]["id"].as_str().unwrap().to_string();

        let (_, scope) = send(
            &router,
            "POST",
            &format!("/rule-sets/{id}/sections/payer/scopes"),
            Some(serde_json::json!({"scope_type": "NPI"})),
        )
        .await;
        let cid = scope["condition_id"].as_u64().unwrap();
        let sid = scope["scope_id"].as_u64().unwrap();
        let tags = format!("/rule-sets/{id}/sections/procedure/conditions/{cid}/scopes/{sid}/tags");

        send(&router, "POST", &tags, Some(serde_json::json!({"input": "1003000126"}))).await;
        let (status, _) = send(&router, "DELETE", &format!("{tags}/0"), None).await;
        assert_eq!(status, StatusCode::OK);

        let rule_set = entitlements.get(RuleSetId::parse(&id).unwrap()).unwrap();
        assert!(rule_set
            .current()
            .tree(SectionKey::Procedure)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn export_then_import_round_trips() {
        let (router, _) = app();
        let (_, created) = send(
            &router,
            "POST",
            "/rule-sets",
            Some(serde_json::json!({"name": "Source", "product": "clear_contracts"})),
        )
        .await;
        let id = created["summary"]["id"].as_str().unwrap().to_string();
        send(
            &router,
            "POST",
            &format!("/rule-sets/{id}/sections/clear/scopes"),
            Some(serde_json::json!({"scope_type": "Payers"})),
        )
        .await;

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/rule-sets/{id}/export"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let yaml = String::from_utf8(
            response.into_body().collect().await.unwrap().to_bytes().to_vec(),
        )
        .unwrap();
        assert!(yaml.contains("Payers"));

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rule-sets/import/Copy")
                    .body(Body::from(yaml))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
