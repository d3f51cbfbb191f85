use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/listings", listing_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn listing_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::listing::list_listings,
            handlers::listing::create_listing
        ))
        .routes(routes!(
            handlers::listing::get_listing,
            handlers::listing::update_listing
        ))
        .routes(routes!(handlers::listing::enquire_listing))
        .layer(handlers::listing::submission_body_limit())
}
