use utoipa::OpenApi;

use crate::server::entry::{CreateEntryRequest, DeleteEntryRequest, EntryPayload};
use crate::server::error::ApiEnvelope;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Luban API",
        version = "0.1.0",
        description = "Per-user entry trees and application content"
    ),
    paths(
        crate::server::entry::current_user,
        crate::server::entry::list_entries,
        crate::server::entry::create_entry,
        crate::server::entry::delete_entry,
        crate::server::app::load_app,
        crate::server::app::save_app,
    ),
    components(schemas(
        ApiEnvelope,
        CreateEntryRequest,
        DeleteEntryRequest,
        EntryPayload,
    )),
    tags(
        (name = "entries", description = "Directories and applications of the current user"),
        (name = "apps", description = "Application content"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/app", "/currentUser", "/currentUser/entry"]);
        let entry = &doc.paths.paths["/currentUser/entry"];
        assert!(entry.get.is_some());
        assert!(entry.post.is_some());
        assert!(entry.delete.is_some());
    }

    #[test]
    fn request_bodies_have_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        for name in ["CreateEntryRequest", "DeleteEntryRequest", "EntryPayload", "ApiEnvelope"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
        let json = doc.to_json().expect("serialize");
        assert!(json.contains("entryName"));
    }
}
