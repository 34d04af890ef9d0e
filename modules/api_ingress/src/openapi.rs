use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

/// Combines module documents into the single document served at `/openapi.json`.
pub fn build_document(modules: impl IntoIterator<Item = OpenApi>) -> OpenApi {
    let mut doc = OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("DormEase API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Student housing marketplace"))
                .build(),
        )
        .build();
    for module in modules {
        doc.merge(module);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::path::{HttpMethod, OperationBuilder, PathItem};
    use utoipa::openapi::PathsBuilder;

    fn module_doc(path: &str) -> OpenApi {
        OpenApiBuilder::new()
            .paths(
                PathsBuilder::new()
                    .path(path, PathItem::new(HttpMethod::Get, OperationBuilder::new().build())),
            )
            .build()
    }

    #[test]
    fn merged_document_keeps_paths_and_title() {
        let doc = build_document([module_doc("/listings"), module_doc("/bookings")]);
        assert_eq!(doc.info.title, "DormEase API");
        assert!(doc.paths.paths.contains_key("/listings"));
        assert!(doc.paths.paths.contains_key("/bookings"));
    }
}
