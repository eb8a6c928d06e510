//! OpenAPI document assembly.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::models::{
    MessageResponse,
    action_logs::{ActionLogResponse, ActionLogUser},
    auth::{AuthResponse, LoginRequest, ProfileUpdateRequest, RegisterRequest},
    categories::{BulkDeleteResponse, CategoryCreate, CategoryResponse, CategoryUpdate},
    questions::{QuestionCreate, QuestionResponse, QuestionUpdate},
    users::{CurrentUser, Role, RoleUpdateRequest, UserResponse},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "medqa",
        description = "Administrative portal for a medical question/answer knowledge base"
    ),
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::me,
        crate::api::handlers::auth::update_profile,
        crate::api::handlers::categories::list_categories,
        crate::api::handlers::categories::create_category,
        crate::api::handlers::categories::update_category,
        crate::api::handlers::categories::delete_category,
        crate::api::handlers::categories::category_questions,
        crate::api::handlers::categories::delete_category_questions,
        crate::api::handlers::categories::export_categories,
        crate::api::handlers::questions::list_questions,
        crate::api::handlers::questions::create_question,
        crate::api::handlers::questions::update_question,
        crate::api::handlers::questions::delete_question,
        crate::api::handlers::questions::export_questions,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::update_user_role,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::action_logs::list_action_logs,
        crate::api::handlers::action_logs::export_action_logs,
    ),
    components(schemas(
        Role,
        CurrentUser,
        UserResponse,
        RoleUpdateRequest,
        RegisterRequest,
        LoginRequest,
        ProfileUpdateRequest,
        AuthResponse,
        CategoryCreate,
        CategoryUpdate,
        CategoryResponse,
        BulkDeleteResponse,
        QuestionCreate,
        QuestionUpdate,
        QuestionResponse,
        ActionLogUser,
        ActionLogResponse,
        MessageResponse,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
