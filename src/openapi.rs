use utoipa::OpenApi;

use crate::models::{ApiResponse, BookingRequest, ClassRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::create_class,
        crate::handlers::create_booking
    ),
    components(schemas(ClassRequest, BookingRequest, ApiResponse)),
    tags(
        (name = "scheduling", description = "Class scheduling and booking operations")
    )
)]
pub struct ApiDoc;
