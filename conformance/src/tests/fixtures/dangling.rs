//! An ontology importing a name no document declares.

/// Imports `http://example.com/nowhere`.
pub const DANGLING: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .

<http://example.com/dangling> a owl:Ontology ;
    owl:imports <http://example.com/nowhere> .

<http://example.com/dangling#D> a owl:Class .
"#;
