//! Account HTTP handlers.
//!
//! ```text
//! POST /api/user/register {"username":"ada","email":"ada@example.com","password":"pw"}
//! POST /api/user/login {"email":"ada@example.com","password":"pw"}
//! GET /api/user/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{LoginRequest, LoginResponse, RegisterRequest};
use crate::domain::{AddressInput, CityId, ResolvedAddress, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerUser;
use crate::inbound::http::cities::CityResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_email, parse_id, parse_password, parse_username,
    require_text,
};

/// Postal address supplied at registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub city_id: Option<String>,
    pub street: Option<String>,
}

/// Registration payload for `POST /api/user/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<i32>,
    pub address: Option<AddressRequest>,
}

/// Login payload for `POST /api/user/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Address as returned with a profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: String,
    pub street: String,
    pub city: CityResponse,
}

impl From<ResolvedAddress> for AddressResponse {
    fn from(value: ResolvedAddress) -> Self {
        Self {
            id: value.address.id.to_string(),
            street: value.address.street,
            city: CityResponse::from(value.city),
        }
    }
}

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub age: Option<i32>,
    pub role: String,
    pub address: Option<AddressResponse>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username.to_string(),
            email: value.email.to_string(),
            age: value.age,
            role: value.role.as_str().to_owned(),
            address: value.address.map(AddressResponse::from),
        }
    }
}

/// Token and profile returned after a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseBody {
    pub access_token: String,
    pub expires_at: String,
    pub user: UserProfileResponse,
}

impl From<LoginResponse> for LoginResponseBody {
    fn from(value: LoginResponse) -> Self {
        Self {
            access_token: value.token.token,
            expires_at: value.token.expires_at.to_rfc3339(),
            user: UserProfileResponse::from(value.profile),
        }
    }
}

fn parse_address(address: AddressRequest) -> ApiResult<AddressInput> {
    let city_field = FieldName::new("address.cityId");
    let raw_city = address
        .city_id
        .ok_or_else(|| missing_field_error(city_field))?;
    Ok(AddressInput {
        city_id: parse_id(&raw_city, city_field, CityId::parse)?,
        street: require_text(address.street, FieldName::new("address.street"))?,
    })
}

fn parse_register_request(body: RegisterRequestBody) -> ApiResult<RegisterRequest> {
    Ok(RegisterRequest {
        username: parse_username(body.username)?,
        email: parse_email(body.email)?,
        password: parse_password(body.password)?,
        age: body.age,
        address: body.address.map(parse_address).transpose()?,
    })
}

/// Create an account, together with its address when one is supplied.
#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterRequestBody,
    responses(
        (status = 201, description = "Account created", body = UserProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown city", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/user/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_register_request(payload.into_inner())?;
    let profile = state.accounts.register(request).await?;
    Ok(HttpResponse::Created().json(UserProfileResponse::from(profile)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Login success", body = LoginResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Incorrect email or password", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<LoginResponseBody>> {
    let body = payload.into_inner();
    let request = LoginRequest {
        email: parse_email(body.email)?,
        password: parse_password(body.password)?,
    };
    let response = state.accounts.login(request).await?;
    Ok(web::Json(LoginResponseBody::from(response)))
}

/// Profile of the authenticated caller.
#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = 200, description = "Current user", body = UserProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: BearerUser,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let profile = state.accounts_query.get_user(caller.user_id()).await?;
    Ok(web::Json(UserProfileResponse::from(profile)))
}
