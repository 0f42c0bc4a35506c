//! Cycle: `left` and `right` import each other.

/// One side of the cycle.
pub const CYCLE_LEFT: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .

<http://example.com/cycle/left> a owl:Ontology ;
    owl:imports <http://example.com/cycle/right> .

<http://example.com/cycle/left#L> a owl:Class .
"#;

/// The other side of the cycle.
pub const CYCLE_RIGHT: &str = r#"
@prefix owl: <http://www.w3.org/2002/07/owl#> .

<http://example.com/cycle/right> a owl:Ontology ;
    owl:imports <http://example.com/cycle/left> .

<http://example.com/cycle/right#R> a owl:Class .
"#;
