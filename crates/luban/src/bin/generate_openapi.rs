//! Writes the OpenAPI document to `docs/openapi.json` at the workspace root.
//!
//! Usage: `cargo run --bin generate_openapi`

use luban::server::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spec = ApiDoc::openapi().to_pretty_json()?;

    let out_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../docs");
    std::fs::create_dir_all(&out_dir)?;

    let out_path = out_dir.join("openapi.json");
    std::fs::write(&out_path, &spec)?;

    println!("Wrote OpenAPI spec to {}", out_path.display());
    Ok(())
}
