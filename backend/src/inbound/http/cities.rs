//! City reference data handlers.
//!
//! ```text
//! GET /api/city/all
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::City;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// City as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "臺北市")]
    pub name: String,
}

impl From<City> for CityResponse {
    fn from(value: City) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
        }
    }
}

/// List every known city, ordered by name.
#[utoipa::path(
    get,
    path = "/api/city/all",
    responses(
        (status = 200, description = "Cities", body = [CityResponse]),
        (status = 503, description = "Database unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["cities"],
    operation_id = "listCities",
    security([])
)]
#[get("/city/all")]
pub async fn list_cities(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<CityResponse>>> {
    let cities = state.cities.list_cities().await?;
    Ok(web::Json(cities.into_iter().map(CityResponse::from).collect()))
}
