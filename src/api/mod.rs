mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::llm::{Generator, ImageGenerator};
use crate::wizard::{ScopeHandle, SessionRegistry, WizardHandle};

pub use middleware::SecurityConfig;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub generator: Arc<dyn Generator>,
    pub images: Arc<dyn ImageGenerator>,
    pub wizards: Arc<SessionRegistry<WizardHandle>>,
    pub scopes: Arc<SessionRegistry<ScopeHandle>>,
}

impl AppState {
    pub fn new(db: Database, generator: Arc<dyn Generator>, images: Arc<dyn ImageGenerator>) -> Self {
        Self {
            db,
            generator,
            images,
            wizards: Arc::new(SessionRegistry::new()),
            scopes: Arc::new(SessionRegistry::new()),
        }
    }
}

pub fn create_router(state: AppState, security: SecurityConfig) -> Router {
    let mut api = Router::new()
        // Templates
        .route("/templates", get(handlers::list_templates).post(handlers::create_template))
        .route(
            "/templates/{id}",
            get(handlers::get_template)
                .put(handlers::update_template)
                .delete(handlers::delete_template),
        )
        // Document history
        .route(
            "/documents",
            get(handlers::list_documents)
                .post(handlers::create_document)
                .delete(handlers::clear_documents),
        )
        .route("/documents/generate", post(handlers::generate_document))
        .route(
            "/documents/{id}",
            get(handlers::get_document).delete(handlers::delete_document),
        )
        // Idea-shaping wizard
        .route("/wizards", post(handlers::create_wizard))
        .route(
            "/wizards/{id}",
            get(handlers::get_wizard).delete(handlers::delete_wizard),
        )
        .route("/wizards/{id}/idea", post(handlers::submit_idea))
        .route("/wizards/{id}/agenda/dimensions", post(handlers::insert_dimension))
        .route(
            "/wizards/{id}/agenda/dimensions/{dimension_id}",
            put(handlers::rename_dimension).delete(handlers::remove_dimension),
        )
        .route("/wizards/{id}/agenda/reorder", post(handlers::reorder_dimensions))
        .route("/wizards/{id}/agenda/confirm", post(handlers::confirm_agenda))
        .route("/wizards/{id}/options", post(handlers::load_options))
        .route("/wizards/{id}/options/{option_id}", put(handlers::edit_option))
        .route("/wizards/{id}/select", post(handlers::select_option))
        .route("/wizards/{id}/navigate", post(handlers::navigate_to))
        .route("/wizards/{id}/reset", post(handlers::reset_wizard))
        .route("/wizards/{id}/brief", get(handlers::get_brief))
        .route("/wizards/{id}/brief/markdown", get(handlers::export_brief))
        .route("/wizards/{id}/brief/save", post(handlers::save_brief))
        // Legacy scope-document wizard
        .route("/scopes", post(handlers::create_scope))
        .route("/scopes/{id}", get(handlers::get_scope))
        .route("/scopes/{id}/prompt", post(handlers::submit_prompt))
        .route("/scopes/{id}/ideas/{idea_id}/include", post(handlers::include_idea))
        .route("/scopes/{id}/ideas/{idea_id}/dismiss", post(handlers::dismiss_idea))
        .route(
            "/scopes/{id}/draft",
            post(handlers::draft_scope).put(handlers::edit_draft),
        )
        .route("/scopes/{id}/finalize", post(handlers::finalize_scope))
        .route("/scopes/{id}/back", post(handlers::scope_back))
        .route("/scopes/{id}/reset", post(handlers::reset_scope))
        .route("/scopes/{id}/export", get(handlers::export_scope))
        // Mockups
        .route("/mockups", post(handlers::create_mockup));

    if let Some(limiter) = security.rate_limiter.clone() {
        api = api.layer(from_fn_with_state(limiter, middleware::rate_limit_middleware));
    }
    api = api.layer(from_fn_with_state(security.clone(), middleware::auth_middleware));

    // Health stays reachable without credentials.
    let api = api.route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&security))
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    match &security.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        None => CorsLayer::permissive(),
    }
}
