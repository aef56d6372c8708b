//! OpenAPI documentation for the hospital administration API.
//!
//! Served as JSON at `/api-docs/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::OpenApi;

use crate::api;
use crate::validation::FieldError;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "medctl",
        description = "Hospital administration API: doctors, appointments, health articles, support tickets, inventory and users.

Validation failures return `400` with `missingFields` listing every absent field and `invalidFields` listing every malformed one."
    ),
    paths(
        api::handlers::doctors::create_doctor,
        api::handlers::doctors::list_doctors,
        api::handlers::doctors::get_doctor,
        api::handlers::doctors::update_doctor,
        api::handlers::doctors::delete_doctor,
        api::handlers::doctors::specialization_counts,
        api::handlers::appointments::create_appointment,
        api::handlers::appointments::list_appointments,
        api::handlers::appointments::get_appointment,
        api::handlers::appointments::update_appointment,
        api::handlers::appointments::delete_appointment,
        api::handlers::articles::create_article,
        api::handlers::articles::list_articles,
        api::handlers::articles::get_article,
        api::handlers::articles::update_article,
        api::handlers::articles::delete_article,
        api::handlers::articles::category_counts,
        api::handlers::tickets::create_ticket,
        api::handlers::tickets::list_tickets,
        api::handlers::tickets::search_tickets,
        api::handlers::tickets::get_ticket,
        api::handlers::tickets::update_ticket,
        api::handlers::tickets::delete_ticket,
        api::handlers::inventory::create_item,
        api::handlers::inventory::list_items,
        api::handlers::inventory::get_item,
        api::handlers::inventory::update_item,
        api::handlers::inventory::delete_item,
        api::handlers::inventory::stock_report,
        api::handlers::inventory::check_stock,
        api::handlers::users::register_user,
        api::handlers::users::login,
        api::handlers::users::list_users,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
    ),
    components(
        schemas(
            api::models::common::MessageResponse,
            api::models::common::ErrorResponse,
            FieldError,
            api::models::doctors::DoctorCreate,
            api::models::doctors::DoctorResponse,
            api::models::doctors::SpecializationCount,
            api::models::appointments::AppointmentCreate,
            api::models::appointments::AppointmentResponse,
            api::models::articles::ArticleCategory,
            api::models::articles::ArticleCreate,
            api::models::articles::ArticleResponse,
            api::models::articles::CategoryCount,
            api::models::tickets::TicketStatus,
            api::models::tickets::TicketPriority,
            api::models::tickets::TicketCreate,
            api::models::tickets::TicketUpdate,
            api::models::tickets::TicketResponse,
            api::models::inventory::InventoryItemCreate,
            api::models::inventory::InventoryItemResponse,
            api::models::inventory::StockReport,
            api::models::inventory::StockCheckResponse,
            api::models::users::Role,
            api::models::users::UserProfile,
            api::models::users::UserCreate,
            api::models::users::UserUpdate,
            api::models::users::UserResponse,
            api::models::users::LoginRequest,
            api::models::users::LoginResponse,
        )
    ),
    tags(
        (name = "doctors", description = "Doctor records and specialization counts"),
        (name = "appointments", description = "Appointment booking"),
        (name = "articles", description = "Health resource articles"),
        (name = "tickets", description = "Support tickets"),
        (name = "inventory", description = "Inventory stock"),
        (name = "users", description = "Registration, login and accounts"),
    )
)]
pub struct ApiDoc;
