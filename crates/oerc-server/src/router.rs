use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use oerc_types::{Event, Faq, GlobalConference, ResearchPaper};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::newsletter::WEBHOOK_SECRET_HEADER;
use crate::state::AppState;
use crate::{admin, assets, auth, handler, newsletter};

/// Build the axum router with every site endpoint.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(WEBHOOK_SECRET_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    let public = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/papers", get(handler::papers))
        .route("/v1/papers/tags", get(handler::paper_tags))
        .route("/v1/events", get(handler::list::<Event>))
        .route("/v1/conferences", get(handler::conferences))
        .route("/v1/faqs", get(handler::list::<Faq>))
        .route("/v1/subscribe", post(newsletter::subscribe))
        .route("/v1/hooks/subscriber-created", post(newsletter::subscriber_created))
        .route(
            "/storage/v1/object/public/:bucket/*path",
            get(assets::public_object),
        );

    let session = Router::new()
        .route("/v1/auth/sign-in", post(auth::sign_in))
        .route("/v1/auth/sign-out", post(auth::sign_out))
        .route("/v1/auth/user", get(auth::current_user));

    let admin = Router::new()
        .route("/v1/admin/papers", post(admin::create_paper))
        .route(
            "/v1/admin/papers/:id",
            patch(admin::update_paper).delete(admin::remove::<ResearchPaper>),
        )
        .route("/v1/admin/events", post(admin::create::<Event>))
        .route(
            "/v1/admin/events/:id",
            patch(admin::update::<Event>).delete(admin::remove::<Event>),
        )
        .route("/v1/admin/conferences", post(admin::create::<GlobalConference>))
        .route(
            "/v1/admin/conferences/:id",
            patch(admin::update::<GlobalConference>).delete(admin::remove::<GlobalConference>),
        )
        .route("/v1/admin/faqs", post(admin::create::<Faq>))
        .route(
            "/v1/admin/faqs/:id",
            patch(admin::update::<Faq>).delete(admin::remove::<Faq>),
        )
        .route("/v1/admin/subscribers", get(newsletter::list_subscribers))
        .route("/v1/admin/subscribers/:id", delete(newsletter::remove_subscriber))
        .route("/v1/admin/newsletter", post(newsletter::send_newsletter));

    public
        .merge(session)
        .merge(admin)
        .layer(upload_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
