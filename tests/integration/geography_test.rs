//! Geography resolution tests.

use census_query::api::{ApiCall, MockCensusApi};
use census_query::geography::{Country, GeographyResolver, Resolution};
use tempfile::tempdir;

#[tokio::test]
async fn test_every_resolution_resolves_country_coverage() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let resolver = GeographyResolver::new(&api);

    for resolution in Resolution::all() {
        for token in ["E", "EW", "GB", "UK"] {
            let codes = resolver.resolve(token, resolution.label()).await.unwrap();
            assert!(!codes.is_empty(), "{token} at {resolution} resolved to nothing");
        }
    }
}

#[tokio::test]
async fn test_uk_local_authorities_returned_unmodified() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());

    let codes = GeographyResolver::new(&api).resolve("UK", "LA").await.unwrap();

    let uk = Country::UnitedKingdom.nomis_code();
    assert_eq!(codes, api.geo_codes_for(uk, Resolution::LocalAuthority));
}

#[tokio::test]
async fn test_unsupported_resolutions_are_fatal() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let resolver = GeographyResolver::new(&api);

    for token in ["", "WARD", "MSOA", "la", "OA21", "TYPE464"] {
        let err = resolver.resolve("UK", token).await.unwrap_err();
        assert!(err.is_fatal(), "{token} should be fatal");
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_name_lookup_precedes_expansion() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());

    let codes = GeographyResolver::new(&api)
        .resolve("Leeds,Manchester", "MSOA11")
        .await
        .unwrap();

    let lad = vec!["1946157127".to_string(), "1946157089".to_string()];
    assert_eq!(
        api.calls(),
        vec![
            ApiCall::GetLadCodes(vec!["Leeds".to_string(), "Manchester".to_string()]),
            ApiCall::GetGeoCodes(lad, Resolution::Msoa2011),
        ]
    );
    assert_eq!(codes.len(), 6);
}

#[tokio::test]
async fn test_resolution_is_deterministic() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let resolver = GeographyResolver::new(&api);

    let first = resolver.resolve("Manchester,Leeds", "OA01").await.unwrap();
    let second = resolver.resolve("Manchester,Leeds", "OA01").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_query_value(), second.to_query_value());
}
