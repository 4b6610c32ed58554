//! Integration tests for convex-basket.
//!
//! These tests run full builds over realistic universes and check the
//! assembled output end to end.

use approx::assert_relative_eq;
use convex_basket::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// =============================================================================
// TEST FIXTURES
// =============================================================================

/// Routes build logs to the test harness; filter with `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(clippy::too_many_arguments)]
fn create_bond(
    isin: &str,
    sector: &str,
    rating: CreditRating,
    duration: f64,
    liquidity: f64,
    amount: Decimal,
    ytm: f64,
) -> BondRecord {
    BondRecord::builder()
        .isin(isin)
        .sector(sector)
        .rating(rating)
        .duration(duration)
        .liquidity_score(liquidity)
        .amount_outstanding(amount)
        .price(dec!(100))
        .yield_to_maturity(ytm)
        .build()
        .unwrap()
}

/// Five Industrial bonds with liquidity 10..50 plus a mixed credit universe.
fn create_universe() -> Universe {
    init_tracing();
    Universe::new(vec![
        // Industrials
        create_bond("US0000000I01", "Industrials", CreditRating::A, 3.2, 10.0, dec!(400_000_000), 0.045),
        create_bond("US0000000I02", "INDUSTRIAL", CreditRating::AMinus, 4.1, 20.0, dec!(500_000_000), 0.047),
        create_bond("US0000000I03", "industrial", CreditRating::BBBPlus, 5.6, 30.0, dec!(750_000_000), 0.049),
        create_bond("US0000000I04", "Industrial", CreditRating::BBB, 6.3, 40.0, dec!(600_000_000), 0.052),
        create_bond("US0000000I05", "IND", CreditRating::BBBMinus, 8.4, 50.0, dec!(1_000_000_000), 0.055),
        // Financials
        create_bond("XS0000000F01", "Financials", CreditRating::AA, 2.5, 85.0, dec!(2_000_000_000), 0.041),
        create_bond("XS0000000F02", "FIN", CreditRating::AMinus, 4.8, 70.0, dec!(1_250_000_000), 0.046),
        create_bond("XS0000000F03", "Financial", CreditRating::BBB, 4.9, 60.0, dec!(900_000_000), 0.051),
        create_bond("XS0000000F04", "Financial", CreditRating::BBPlus, 6.1, 35.0, dec!(500_000_000), 0.068),
        // Utilities
        create_bond("US0000000U01", "Utilities", CreditRating::A, 11.5, 45.0, dec!(800_000_000), 0.050),
        create_bond("US0000000U02", "UTIL", CreditRating::APlus, 12.2, 55.0, dec!(700_000_000), 0.049),
        // High yield energy
        create_bond("US0000000E01", "Energy", CreditRating::B, 3.9, 25.0, dec!(300_000_000), 0.089),
        create_bond("US0000000E02", "Energy", CreditRating::NotRated, 4.4, 15.0, dec!(200_000_000), 0.095),
    ])
    .unwrap()
}

fn constraints_off() -> ConstraintConfig {
    ConstraintConfig::new()
        .with_max_position_weight(1.0)
        .with_min_effective_positions(None)
}

// =============================================================================
// SECTOR BASKETS
// =============================================================================

#[test]
fn test_industrial_liquidity_basket() {
    let universe = create_universe();
    let spec = BasketSpec::sector("Industrial")
        .with_size_limit(3)
        .with_weighting(WeightingMethod::Liquidity { power: 1.0 });

    let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();

    assert_eq!(
        basket.isins(),
        vec!["US0000000I05", "US0000000I04", "US0000000I03"]
    );
    let weights: Vec<f64> = basket.constituents.iter().map(|c| c.weight).collect();
    assert_relative_eq!(weights[0], 0.4167, epsilon = 1e-4);
    assert_relative_eq!(weights[1], 0.3333, epsilon = 1e-4);
    assert_relative_eq!(weights[2], 0.25, epsilon = 1e-4);
    assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);

    assert_eq!(basket.metadata.candidates_matched, 5);
    assert_eq!(basket.metadata.constituent_count, 3);
    assert_eq!(basket.quality_metrics.sector_distribution.len(), 1);
    assert_relative_eq!(
        basket.quality_metrics.sector_distribution["Industrial"],
        1.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_sector_rating_duration_basket() {
    let universe = create_universe();
    let spec = BasketSpec::sector_rating_duration(
        "Financial",
        RatingFilter::InvestmentGrade,
        DurationFilter::bucket(DurationBucket::ThreeToFive),
    )
    .with_weighting(WeightingMethod::AmountOutstanding)
    .with_constraints(constraints_off());

    let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();

    assert_eq!(basket.isins(), vec!["XS0000000F02", "XS0000000F03"]);
    let w = basket.weights();
    assert_relative_eq!(w.get("XS0000000F02").unwrap(), 1250.0 / 2150.0, epsilon = 1e-12);
    assert!(basket.is_compliant());
    assert!(basket.warnings.is_empty());
    assert_eq!(
        basket.quality_metrics.duration_distribution.keys().collect::<Vec<_>>(),
        vec!["3-5Y"]
    );
}

#[test]
fn test_rating_band_excludes_unrated() {
    let universe = create_universe();
    let spec = BasketSpec::sector_rating(
        "Energy",
        RatingFilter::range(CreditRating::BBPlus, CreditRating::D),
    )
    .with_constraints(constraints_off());

    let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();
    assert_eq!(basket.isins(), vec!["US0000000E01"]);
    assert_eq!(basket.quality_metrics.investment_grade_weight, 0.0);
}

// =============================================================================
// EMPTY RESULTS
// =============================================================================

#[test]
fn test_empty_universe() {
    let spec = BasketSpec::sector("Industrial");
    let basket = BasketConstructor::new()
        .build_basket(&spec, &Universe::empty())
        .unwrap();

    assert!(basket.is_empty());
    assert_eq!(basket.warnings, vec![NO_CANDIDATES_WARNING.to_string()]);
    assert_eq!(basket.quality_metrics.effective_positions, 0.0);
    assert!(basket.violations.is_empty());
}

#[test]
fn test_no_match_is_not_error() {
    let universe = create_universe();
    let spec = BasketSpec::sector("Sovereign").with_weighting(WeightingMethod::liquidity());
    let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();

    assert!(basket.is_empty());
    assert_eq!(basket.metadata.universe_size, 13);
    assert_eq!(basket.metadata.candidates_matched, 0);
    assert!(basket.warnings.iter().any(|w| w == NO_CANDIDATES_WARNING));
}

// =============================================================================
// CONSTRAINT MODES
// =============================================================================

#[test]
fn test_advisory_vs_strict() {
    let universe = create_universe();
    let limits = ConstraintConfig::new()
        .with_max_position_weight(0.3)
        .with_max_rating_weight(0.5);

    let advisory = BasketSpec::sector("Industrial")
        .with_size_limit(3)
        .with_weighting(WeightingMethod::liquidity())
        .with_constraints(limits.clone());
    let basket = BasketConstructor::new()
        .build_basket(&advisory, &universe)
        .unwrap();

    let kinds: Vec<ViolationKind> = basket.violations.iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ViolationKind::PositionConcentration,
            ViolationKind::PositionConcentration,
            ViolationKind::Diversification,
        ]
    );
    assert_eq!(basket.warnings.len(), 3);

    let strict = advisory.with_constraints(limits.with_mode(ValidationMode::Strict));
    let err = BasketConstructor::new()
        .build_basket(&strict, &universe)
        .unwrap_err();
    match err {
        BasketError::ConstraintViolation { violations } => {
            assert_eq!(violations.len(), 3);
            assert_eq!(violations[0].entity, "US0000000I05");
        }
        other => panic!("expected constraint violation, got {other}"),
    }
}

#[test]
fn test_revalidate_output() {
    let universe = create_universe();
    let spec = BasketSpec::sector("Financial").with_constraints(constraints_off());
    let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();
    assert!(basket.is_compliant());

    let tighter = ConstraintConfig::new().with_max_position_weight(0.2);
    let violations = ConstraintValidator::new(&tighter).validate_constraints(&basket);
    assert_eq!(violations.len(), 4);
    assert!(violations.iter().all(ConstraintViolation::is_blocking));
}

// =============================================================================
// SIMILARITY BASKETS
// =============================================================================

#[test]
fn test_similarity_basket() {
    let universe = create_universe();
    let config = SimilarityConfig::new()
        .with_max_duration_diff(2.0)
        .with_max_rating_notches(4);
    let spec = BasketSpec::similarity("US0000000I03", config)
        .with_size_limit(4)
        .with_constraints(constraints_off());

    let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();

    assert!(basket.constituent("US0000000I03").is_none());
    assert!(!basket.is_empty() && basket.len() <= 4);
    let scores: Vec<f64> = basket
        .constituents
        .iter()
        .map(|c| c.similarity_score.unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    assert_eq!(basket.metadata.reference_isin.as_deref(), Some("US0000000I03"));
    // Same sector, one notch away, 0.7 years apart
    assert_eq!(basket.isins()[0], "US0000000I04");
}

#[test]
fn test_similarity_missing_reference() {
    let universe = create_universe();
    let spec = BasketSpec::similarity("XX0000000000", SimilarityConfig::default());
    let err = BasketConstructor::new()
        .build_basket(&spec, &universe)
        .unwrap_err();
    assert!(matches!(err, BasketError::ReferenceNotFound { ref isin } if isin == "XX0000000000"));
}

#[test]
fn test_similarity_invalid_weights() {
    let universe = create_universe();
    let zero = SimilarityWeights {
        duration: 0.0,
        rating: 0.0,
        sector: 0.0,
        liquidity: 0.0,
    };
    let spec = BasketSpec::similarity("US0000000I03", SimilarityConfig::new().with_weights(zero));
    let err = BasketConstructor::new()
        .build_basket(&spec, &universe)
        .unwrap_err();
    assert!(matches!(err, BasketError::InvalidSpecification { .. }));
}

// =============================================================================
// CUSTOM WEIGHTING
// =============================================================================

#[test]
fn test_custom_yield_weighting() {
    let universe = create_universe();
    let spec = BasketSpec::sector("Utility")
        .with_weighting(WeightingMethod::Custom {
            name: "yield".into(),
        })
        .with_constraints(constraints_off());

    let strategy = WeightingStrategy::custom("yield", |bonds: &[&BondRecord]| {
        bonds
            .iter()
            .map(|b| b.yield_to_maturity.unwrap_or(0.0))
            .collect()
    });
    let basket = BasketConstructor::new()
        .build_basket_with_weighting(&spec, &universe, &strategy)
        .unwrap();

    let w = basket.weights();
    assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(w.get("US0000000U01").unwrap(), 0.050 / 0.099, epsilon = 1e-12);
}

#[test]
fn test_custom_weighting_bad_scores() {
    let universe = create_universe();
    let spec = BasketSpec::sector("Utility");
    let strategy = WeightingStrategy::custom("broken", |_: &[&BondRecord]| vec![1.0]);
    let err = BasketConstructor::new()
        .build_basket_with_weighting(&spec, &universe, &strategy)
        .unwrap_err();
    assert!(matches!(err, BasketError::InvalidWeightingInput { .. }));
}

// =============================================================================
// SCHEMA
// =============================================================================

#[test]
fn test_schema_mismatch() {
    let mut bad = create_bond("US0000000B01", "Industrial", CreditRating::A, 5.0, 50.0, dec!(1), 0.05);
    bad.liquidity_score = 250.0;

    let err = BasketConstructor::new()
        .build_basket_from_records(&BasketSpec::sector("Industrial"), vec![bad])
        .unwrap_err();
    assert!(matches!(err, BasketError::SchemaMismatch { .. }));
}

// =============================================================================
// INTERCHANGE
// =============================================================================

#[test]
fn test_spec_round_trips() {
    let spec = BasketSpec::sector_rating("Financial", RatingFilter::range(CreditRating::AA, CreditRating::BBB))
        .with_name("fin-ig")
        .with_size_limit(25)
        .with_min_liquidity(40.0)
        .with_weighting(WeightingMethod::Liquidity { power: 2.0 })
        .with_constraints(
            ConstraintConfig::strict()
                .with_max_sector_weight(1.0)
                .with_max_rating_weight(0.6),
        );

    assert_eq!(BasketSpec::from_json(&spec.to_json().unwrap()).unwrap(), spec);
    assert_eq!(BasketSpec::from_toml(&spec.to_toml().unwrap()).unwrap(), spec);
}

#[test]
fn test_output_round_trip() {
    let universe = create_universe();
    let spec = BasketSpec::similarity("XS0000000F02", SimilarityConfig::default()).with_size_limit(5);
    let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();

    let json = basket.to_json().unwrap();
    let parsed = BasketOutput::from_json(&json).unwrap();
    assert_eq!(parsed, basket);
}

#[test]
fn test_output_round_trip_keeps_fractional_amounts() {
    init_tracing();
    let universe = Universe::new(vec![
        create_bond("US00000000P1", "Industrial", CreditRating::A, 4.0, 40.0, dec!(123456789.123456789), 0.045),
        create_bond("US00000000P2", "Industrial", CreditRating::BBB, 5.0, 60.0, dec!(987654321.000000001), 0.05),
    ])
    .unwrap();
    let spec = BasketSpec::sector("Industrial")
        .with_weighting(WeightingMethod::AmountOutstanding)
        .with_constraints(constraints_off());
    let basket = BasketConstructor::new().build_basket(&spec, &universe).unwrap();
    assert_eq!(
        basket.quality_metrics.total_amount_outstanding,
        dec!(1111111110.123456790)
    );

    let parsed = BasketOutput::from_json(&basket.to_json().unwrap()).unwrap();
    assert_eq!(parsed, basket);
    let first = parsed
        .constituents
        .iter()
        .find(|c| c.isin() == "US00000000P1")
        .unwrap();
    assert_eq!(first.bond.amount_outstanding, dec!(123456789.123456789));
}

#[test]
fn test_unsupported_basket_type_document() {
    let err = BasketSpec::from_json(r#"{"basket_type": "momentum", "filters": {}}"#).unwrap_err();
    assert!(matches!(err, BasketError::UnsupportedBasketType { ref basket_type } if basket_type == "momentum"));
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_concurrent_builds_share_universe() {
    let universe = Arc::new(create_universe());
    let spec = BasketSpec::sector("Industrial").with_weighting(WeightingMethod::liquidity());
    let constructor = BasketConstructor::new();

    let results: Vec<BasketOutput> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| constructor.build_basket(&spec, &universe).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &results[0];
    for basket in &results[1..] {
        assert_eq!(basket.isins(), first.isins());
        assert_eq!(basket.weights(), first.weights());
        assert_ne!(basket.basket_id, first.basket_id);
    }
}

#[test]
fn test_batch_build() {
    let universe = create_universe();
    let specs = vec![
        BasketSpec::sector("Industrial"),
        BasketSpec::sector("Financial"),
        BasketSpec::similarity("missing", SimilarityConfig::default()),
        BasketSpec::sector("Utility"),
    ];
    let results = BasketConstructor::with_config(ConstructionConfig::new().with_threshold(2))
        .build_baskets(&specs, &universe);

    assert_eq!(results[0].as_ref().unwrap().len(), 5);
    assert_eq!(results[1].as_ref().unwrap().len(), 4);
    assert!(matches!(results[2], Err(BasketError::ReferenceNotFound { .. })));
    assert_eq!(results[3].as_ref().unwrap().len(), 2);
}
