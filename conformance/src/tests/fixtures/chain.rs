//! Chain: `top` imports `base`.

/// The imported ontology of the chain.
pub const CHAIN_BASE: &str = r#"
@prefix owl:  <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.com/chain/base> a owl:Ontology .

<http://example.com/chain/base#Thing> a owl:Class .
"#;

/// The importing ontology of the chain.
pub const CHAIN_TOP: &str = r#"
@prefix owl:  <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.com/chain/top> a owl:Ontology ;
    owl:imports <http://example.com/chain/base> .

<http://example.com/chain/top#Widget>
    a               owl:Class ;
    rdfs:subClassOf <http://example.com/chain/base#Thing> .
"#;
