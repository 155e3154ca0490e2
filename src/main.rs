use axum::middleware::{from_fn, from_fn_with_state};
use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crm_api::middleware::{authenticate, require_admin, require_agent_or_admin};
use crm_api::services::accounts;
use crm_api::state::AppState;
use crm_api::{config, store};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, CRM_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::config();
    tracing::info!("Starting CRM API in {:?} mode", config.environment);
    if crm_api::is_development!() && config.store.database_url.is_none() {
        tracing::warn!("no DATABASE_URL set, documents live in memory only");
    }

    let store = store::init_from_config()
        .await
        .unwrap_or_else(|e| panic!("failed to initialize document store: {}", e));

    let state = AppState { store };
    bootstrap_admin(&state).await;

    let app = app(state);

    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 CRM API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

/// Creates or promotes the configured admin account. Startup continues on
/// failure; an operator can still run `crm create-admin` by hand.
async fn bootstrap_admin(state: &AppState) {
    let auth = &config::config().auth;
    let (Some(email), Some(password)) = (
        auth.bootstrap_admin_email.as_deref(),
        auth.bootstrap_admin_password.as_deref(),
    ) else {
        return;
    };

    let name = auth.bootstrap_admin_name.as_deref().unwrap_or("Admin");
    if let Err(e) = accounts::ensure_admin(state.store.as_ref(), email, password, name).await {
        tracing::error!("admin bootstrap failed: {}", e.message());
    }
}

fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(profile_routes())
        .merge(customer_routes())
        .merge(sale_routes())
        .merge(payment_routes())
        .merge(revenue_routes())
        .merge(target_routes())
        .merge(performance_routes())
        .merge(comment_routes())
        .merge(notification_routes())
        .merge(setting_routes())
        .merge(audit_log_routes())
        .merge(admin_routes())
        .merge(dashboard_routes())
        .layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(session_routes())
        .merge(protected)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_routes() -> Router<AppState> {
    use axum::routing::post;
    use crm_api::handlers::users;

    Router::new()
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
}

fn profile_routes() -> Router<AppState> {
    use axum::routing::put;
    use crm_api::handlers::users;

    Router::new()
        .route("/api/users/me", get(users::me).put(users::update_me))
        .route("/api/users/me/password", put(users::change_password))
}

fn customer_routes() -> Router<AppState> {
    use crm_api::handlers::customers;

    Router::new()
        .route(
            "/api/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/api/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
}

fn sale_routes() -> Router<AppState> {
    use crm_api::handlers::sales;

    Router::new()
        .route("/api/sales", get(sales::list_sales).post(sales::create_sale))
        .route(
            "/api/sales/:id",
            get(sales::get_sale)
                .put(sales::update_sale)
                .delete(sales::delete_sale),
        )
}

fn payment_routes() -> Router<AppState> {
    use crm_api::handlers::payments;

    Router::new()
        .route(
            "/api/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/api/payments/:id",
            get(payments::get_payment)
                .put(payments::update_payment)
                .delete(payments::delete_payment),
        )
}

// Revenue and performance mutations check the manager guard in the handler;
// the list and get routes on the same paths stay open to any caller.
fn revenue_routes() -> Router<AppState> {
    use crm_api::handlers::revenues;

    Router::new()
        .route(
            "/api/revenues",
            get(revenues::list_revenues).post(revenues::create_revenue),
        )
        .route(
            "/api/revenues/:id",
            get(revenues::get_revenue)
                .put(revenues::update_revenue)
                .delete(revenues::delete_revenue),
        )
}

fn target_routes() -> Router<AppState> {
    use crm_api::handlers::targets;

    Router::new()
        .route(
            "/api/targets",
            get(targets::list_targets).post(targets::create_target),
        )
        .route(
            "/api/targets/:id",
            get(targets::get_target)
                .put(targets::update_target)
                .delete(targets::delete_target),
        )
}

fn performance_routes() -> Router<AppState> {
    use crm_api::handlers::performances;

    Router::new()
        .route(
            "/api/performances",
            get(performances::list_performances).post(performances::create_performance),
        )
        .route(
            "/api/performances/:id",
            get(performances::get_performance)
                .put(performances::update_performance)
                .delete(performances::delete_performance),
        )
}

fn comment_routes() -> Router<AppState> {
    use crm_api::handlers::comments;

    Router::new()
        .route(
            "/api/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/comments/:id",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
}

fn notification_routes() -> Router<AppState> {
    use axum::routing::put;
    use crm_api::handlers::notifications;

    Router::new()
        .route(
            "/api/notifications",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route(
            "/api/notifications/:id",
            get(notifications::get_notification)
                .put(notifications::update_notification)
                .delete(notifications::delete_notification),
        )
        .route(
            "/api/notifications/:id/read",
            put(notifications::mark_notification_read),
        )
}

fn setting_routes() -> Router<AppState> {
    use crm_api::handlers::settings;

    Router::new()
        .route(
            "/api/settings",
            get(settings::list_settings).post(settings::create_setting),
        )
        .route(
            "/api/settings/:id",
            get(settings::get_setting)
                .put(settings::update_setting)
                .delete(settings::delete_setting),
        )
}

fn audit_log_routes() -> Router<AppState> {
    use crm_api::handlers::audit_logs;

    Router::new()
        .route(
            "/api/audit-logs",
            get(audit_logs::list_audit_logs).post(audit_logs::create_audit_log),
        )
        .route(
            "/api/audit-logs/:id",
            get(audit_logs::get_audit_log)
                .put(audit_logs::update_audit_log)
                .delete(audit_logs::delete_audit_log),
        )
        .route_layer(from_fn(require_admin))
}

fn admin_routes() -> Router<AppState> {
    use crm_api::handlers::admin::{agents, users};

    Router::new()
        .route(
            "/api/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/admin/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/admin/agents",
            get(agents::list_agents).post(agents::create_agent),
        )
        .route(
            "/api/admin/agents/:id",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route("/api/admin/agents/:id/stats", get(agents::agent_stats))
        .route_layer(from_fn(require_admin))
}

fn dashboard_routes() -> Router<AppState> {
    use crm_api::handlers::dashboard;

    let admin_view = Router::new()
        .route("/api/dashboard/admin", get(dashboard::admin_dashboard))
        .route_layer(from_fn(require_admin));
    let agent_view = Router::new()
        .route("/api/dashboard/agent", get(dashboard::agent_dashboard))
        .route_layer(from_fn(require_agent_or_admin));

    Router::new()
        .route("/api/dashboard/summary", get(dashboard::dashboard_summary))
        .merge(admin_view)
        .merge(agent_view)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "CRM API",
        "version": version,
        "description": "CRM backend API built with Rust (Axum)",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "session": "/api/users/register, /api/users/login (public)",
            "profile": "/api/users/me[/password] (authenticated)",
            "resources": "/api/{customers,sales,payments,revenues,targets,performances,comments,notifications,settings}[/:id] (authenticated)",
            "audit": "/api/audit-logs[/:id] (admin)",
            "admin": "/api/admin/{users,agents}[/:id] (admin)",
            "dashboard": "/api/dashboard/{admin,agent,summary} (authenticated)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "store_error": e.to_string()
            })),
        ),
    }
}
