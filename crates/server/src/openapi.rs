use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
#[allow(non_snake_case)]
pub struct RegisterRequest { pub name: String, pub teamName: String, pub email: String, pub password: String, pub college: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::legacy::select_event,
        crate::routes::legacy::cancel_event,
        crate::routes::events::list,
        crate::routes::events::register,
        crate::routes::teams::create,
        crate::routes::payments::create_order,
        crate::routes::payments::verify,
        crate::routes::admin::set_payment_status,
        crate::routes::admin::create_event,
        crate::routes::admin::set_registration_status,
        crate::routes::announcements::list,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            crate::routes::legacy::EventIdBody,
            crate::routes::teams::CreateTeamBody,
            crate::routes::teams::InviteBody,
            crate::routes::teams::JoinBody,
            crate::routes::admin::PaymentStatusBody,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "legacy"),
        (name = "events"),
        (name = "teams"),
        (name = "payments"),
        (name = "admin"),
        (name = "announcements")
    )
)]
pub struct ApiDoc;
