//! Print the OpenAPI document as JSON.

use color_eyre::eyre::{Result, WrapErr};
use social_backend::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("serialise OpenAPI document")?;
    println!("{json}");
    Ok(())
}
