// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, attendance_handlers, auth_handlers, employee_handlers, mw_admin, mw_auth,
        report_handlers,
    },
};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public routes ---
    let public_routes = Router::new()
        .route("/api/auth/login", post(auth_handlers::handle_login))
        .route("/api/auth/logout", post(auth_handlers::handle_logout));

    // --- Admin routes (user management) ---
    let admin_routes = Router::new()
        .route(
            "/api/users",
            get(admin_handlers::list_users).post(admin_handlers::create_user),
        )
        .route(
            "/api/users/{id}",
            put(admin_handlers::update_user).delete(admin_handlers::delete_user),
        )
        .route("/api/users/{id}/password", put(admin_handlers::change_password))
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Authenticated routes ---
    // Per-resource permissions are checked in the handlers.
    let authenticated_routes = Router::new()
        .route("/api/auth/me", get(auth_handlers::handle_me))
        .route(
            "/api/employees",
            get(employee_handlers::list_employees).post(employee_handlers::create_employee),
        )
        .route(
            "/api/employees/{id}",
            get(employee_handlers::get_employee).put(employee_handlers::update_employee),
        )
        .route("/api/employees/{id}/archive", post(employee_handlers::archive_employee))
        .route("/api/employees/{id}/restore", post(employee_handlers::restore_employee))
        .route(
            "/api/attendance",
            get(attendance_handlers::daily_view).put(attendance_handlers::save_record),
        )
        .route("/api/attendance/bulk", post(attendance_handlers::bulk_update))
        .route("/api/attendance/monthly", get(attendance_handlers::monthly_view))
        .route("/api/attendance/{id}", delete(attendance_handlers::delete_record))
        .route("/api/reports/attendance", get(report_handlers::attendance_report))
        .route("/api/reports/employees", get(report_handlers::employee_report))
        .route("/api/reports/monthly", get(report_handlers::monthly_report))
        .merge(admin_routes)
        // Applies to everything above, admin routes included.
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}
