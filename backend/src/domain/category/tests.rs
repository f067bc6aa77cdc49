//! Tests for category resolution and catalogue validation.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;

#[fixture]
fn dictionary() -> CategoryResolver {
    CategoryResolver::new(
        ResolverMode::Dictionary,
        Arc::new(CategoryCatalogue::builtin()),
    )
}

#[fixture]
fn raw() -> CategoryResolver {
    CategoryResolver::new(ResolverMode::Raw, Arc::new(CategoryCatalogue::builtin()))
}

fn pair(raw: &str) -> TagPair {
    raw.parse().expect("valid tag pair")
}

#[rstest]
fn builtin_rules_pass_strict_validation() {
    let result = CategoryCatalogue::new(builtin::rules());
    assert!(result.is_ok(), "builtin catalogue invalid: {result:?}");
}

#[rstest]
fn jardin_expands_to_three_ored_tags(dictionary: CategoryResolver) {
    let resolved = dictionary.resolve("jardin").expect("jardin resolves");
    assert_eq!(resolved.label, "garden");
    assert_eq!(
        resolved.tags,
        vec![
            pair("leisure=garden"),
            pair("leisure=park"),
            pair("leisure=common"),
        ]
    );
}

#[rstest]
#[case("restaurant", "restaurant")]
#[case("  Restaurante ", "restaurant")]
#[case("Jardín", "garden")]
#[case("PARQUE", "park")]
#[case("comida%20rapida", "fast_food")]
fn dictionary_lookup_ignores_case_accents_and_encoding(
    dictionary: CategoryResolver,
    #[case] token: &str,
    #[case] label: &str,
) {
    let resolved = dictionary.resolve(token).expect("token resolves");
    assert_eq!(resolved.label, label);
}

#[rstest]
fn unknown_dictionary_token_is_rejected(dictionary: CategoryResolver) {
    let error = dictionary.resolve("volcano").expect_err("unknown token");
    assert_eq!(error.code(), ErrorCode::UnknownCategory);
}

#[rstest]
#[case("amenity=cafe", "amenity", "cafe")]
#[case("amenity%3Dcafe", "amenity", "cafe")]
#[case("name=a=b", "name", "a=b")]
#[case(" shop = bakery ", "shop", "bakery")]
fn raw_tokens_split_on_first_equals(
    raw: CategoryResolver,
    #[case] token: &str,
    #[case] key: &str,
    #[case] value: &str,
) {
    let resolved = raw.resolve(token).expect("raw token resolves");
    assert_eq!(resolved.tags.len(), 1);
    assert_eq!(resolved.tags[0].key(), key);
    assert_eq!(resolved.tags[0].value(), value);
    assert_eq!(resolved.label, format!("{key}={value}"));
}

#[rstest]
#[case("amenity")]
#[case("=cafe")]
#[case("amenity=")]
#[case("  =  ")]
fn malformed_raw_tokens_are_rejected(raw: CategoryResolver, #[case] token: &str) {
    let error = raw.resolve(token).expect_err("malformed token");
    assert_eq!(error.code(), ErrorCode::InvalidCategoryFormat);
}

#[rstest]
fn raw_mode_does_not_consult_the_catalogue(raw: CategoryResolver) {
    let error = raw.resolve("park").expect_err("dictionary names are not raw tags");
    assert_eq!(error.code(), ErrorCode::InvalidCategoryFormat);
}

#[rstest]
fn catalogue_json_overrides_builtin_rules() {
    let json = r#"{
        "categories": [
            { "name": "tacos", "synonyms": ["taqueria"], "tags": ["cuisine=mexican", "amenity=fast_food"] }
        ]
    }"#;
    let catalogue = CategoryCatalogue::from_json(json).expect("catalogue parses");
    let resolver = CategoryResolver::new(ResolverMode::Dictionary, Arc::new(catalogue));

    let resolved = resolver.resolve("Taquería").expect("synonym resolves");
    assert_eq!(resolved.label, "tacos");
    assert_eq!(resolved.tags.len(), 2);
    assert!(resolver.resolve("park").is_err());
}

#[rstest]
#[case(r#"{"categories": []}"#, CatalogueError::Empty)]
#[case(
    r#"{"categories": [{"name": "x", "tags": []}]}"#,
    CatalogueError::NoTags("x".to_owned())
)]
#[case(r#"{"categories": [{"name": " ", "tags": ["a=b"]}]}"#, CatalogueError::BlankName)]
fn invalid_catalogues_are_rejected(#[case] json: &str, #[case] expected: CatalogueError) {
    let error = CategoryCatalogue::from_json(json).expect_err("invalid");
    assert_eq!(error, expected);
}

#[rstest]
fn duplicate_tokens_across_rules_are_rejected() {
    let json = r#"{"categories": [
        {"name": "park", "tags": ["leisure=park"]},
        {"name": "green", "synonyms": ["Park"], "tags": ["leisure=garden"]}
    ]}"#;
    let error = CategoryCatalogue::from_json(json).expect_err("duplicate token");
    assert!(matches!(error, CatalogueError::DuplicateToken { ref token, .. } if token == "park"));
}

#[rstest]
fn malformed_tag_strings_fail_json_parsing() {
    let json = r#"{"categories": [{"name": "x", "tags": ["nonsense"]}]}"#;
    assert!(matches!(
        CategoryCatalogue::from_json(json),
        Err(CatalogueError::Json(_))
    ));
}

#[rstest]
#[case("dictionary", ResolverMode::Dictionary)]
#[case(" RAW ", ResolverMode::Raw)]
fn resolver_mode_parses(#[case] raw: &str, #[case] expected: ResolverMode) {
    assert_eq!(raw.parse::<ResolverMode>(), Ok(expected));
}
