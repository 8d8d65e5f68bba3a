use std::time::Duration;

use crate::{
    BoundsError, Curve, ErrorKind, IntegralError, Integrator, Limits, Method, QUADRATURE_AVAILABLE,
    SamplingPolicy, area_between, evaluate_at, find_intersections, integrate, parse_expression,
    riemann_sum, riemann_sum_best_effort,
};

#[test]
fn test_polynomial_exactness() {
    let report = integrate("x**2", 0.0, 3.0, "x");
    let result = report.outcome.unwrap();
    assert!((result.value - 9.0).abs() < 1e-12);
    assert_eq!(result.method, Method::SymbolicClosedForm);

    let report = integrate("x^3 - 2x + 1", 1, 4, "x");
    assert!((report.value().unwrap() - 51.75).abs() < 1e-12);
}

#[test]
fn test_trig_exactness_with_symbolic_bounds() {
    let report = integrate("sin(x)", 0.0, "pi", "x");
    assert!((report.value().unwrap() - 2.0).abs() < 1e-12);

    let report = integrate("cos(t)", "-pi/2", "pi/2", "t");
    assert!((report.value().unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn test_riemann_examples() {
    let sum = riemann_sum("x**2", 0, 2, 4, SamplingPolicy::Left, "x").unwrap();
    assert!((sum.total - 1.75).abs() < 1e-12);

    // Midpoint error on x^2 is h^2 / 12 over [0, 1]
    let sum = riemann_sum("x^2", 0, 1, 100, SamplingPolicy::Midpoint, "x").unwrap();
    assert!((sum.total - 1.0 / 3.0).abs() < 1e-4);
}

#[test]
fn test_area_and_intersections() {
    let area = area_between("x**2", "x", 0, 1, "x").unwrap();
    assert!((area.area - 1.0 / 6.0).abs() < 1e-9);
    assert_eq!(area.segments[0].upper_curve, Curve::Second);

    let roots = find_intersections("x**2", "4 - x**2", "x", (-3.0, 3.0)).unwrap();
    assert_eq!(roots.len(), 2);
    assert!((roots[0] + 2f64.sqrt()).abs() < 1e-12);
    assert!((roots[1] - 2f64.sqrt()).abs() < 1e-12);
}

#[test]
fn test_pole_in_range_fails() {
    let report = integrate("1/x", -1, 1, "x");
    let err = report.outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert_eq!(err, IntegralError::Singularity { point: 0.0 });
    assert!(!report.diagnostics.quadrature_subsystem_available || QUADRATURE_AVAILABLE);
}

#[test]
fn test_bounds_are_validated_before_evaluation() {
    // 1/x would be a domain error if it were ever evaluated
    let err = integrate("1/x", 0, 0, "x").outcome.unwrap_err();
    assert_eq!(
        err,
        IntegralError::Bounds(BoundsError::Reversed {
            lower: 0.0,
            upper: 0.0
        })
    );

    let err = integrate("x", 2, 1, "x").outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);

    let err = integrate("x", 0.0, 1e11, "x").outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);

    let err = integrate("x", 0.0, f64::NAN, "x").outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);

    let err = integrate("x", "y", 1, "x").outcome.unwrap_err();
    assert!(matches!(
        err,
        IntegralError::Bounds(BoundsError::NotNumeric { .. })
    ));

    let err = integrate("x", 0.0, 2e6, "x").outcome.unwrap_err();
    assert!(matches!(
        err,
        IntegralError::Bounds(BoundsError::WidthExceeded { .. })
    ));
}

#[test]
fn test_parse_and_variable_errors() {
    let report = integrate("x +* 2", 0, 1, "x");
    assert_eq!(report.outcome.unwrap_err().kind(), ErrorKind::Parse);
    assert!(report.diagnostics.attempts.is_empty());
    assert_eq!(report.diagnostics.method_used, None);

    let err = integrate("x + y", 0, 1, "x").outcome.unwrap_err();
    assert_eq!(
        err,
        IntegralError::VariableMismatch {
            expected: "x".to_string(),
            found: vec!["y".to_string()]
        }
    );

    let err = parse_expression("t^2", "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VariableMismatch);

    let err = parse_expression("sin^2", "sin").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VariableMismatch);
}

#[test]
fn test_parser_normalization_equality() {
    let implicit = parse_expression("2x + 3sin(x)", "x").unwrap();
    let explicit = parse_expression("2*x + 3*sin(x)", "x").unwrap();
    assert_eq!(implicit, explicit);

    let powers = parse_expression("x**2", "x").unwrap();
    let caret = parse_expression("x^2", "x").unwrap();
    assert_eq!(powers, caret);
}

#[test]
fn test_evaluate_at_generic_points() {
    let expr = parse_expression("x^2 + 1", "x").unwrap();
    assert_eq!(evaluate_at(&expr, "x", 2).value(), Some(5.0));
    assert_eq!(evaluate_at(&expr, "x", 2.0f32).value(), Some(5.0));
    assert_eq!(evaluate_at(&expr, "x", 2u64).value(), Some(5.0));
}

#[test]
fn test_subdivision_limits() {
    let err = riemann_sum("x", 0, 1, 0, SamplingPolicy::Left, "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Subdivision);

    let err = riemann_sum("x", 0, 1, 10_000_001, SamplingPolicy::Left, "x").unwrap_err();
    assert_eq!(
        err,
        IntegralError::Subdivision {
            n: 10_000_001,
            limit: 10_000_000
        }
    );
}

#[test]
fn test_strict_and_best_effort_riemann() {
    let err = riemann_sum("1/x", -1, 1, 2, SamplingPolicy::Left, "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);

    let sum = riemann_sum_best_effort("1/x", -1, 1, 2, SamplingPolicy::Left, "x").unwrap();
    assert_eq!(sum.substituted_points, vec![0.0]);
    assert!((sum.total + 1.0).abs() < 1e-12);
}

#[test]
fn test_timeout() {
    let report = Integrator::new()
        .timeout(Duration::ZERO)
        .integrate("exp(-x^2)", 0, 1);
    let err = report.outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[test]
fn test_huge_nested_powers_stay_within_deadline() {
    let timeout = Duration::from_secs(2);
    let started = std::time::Instant::now();
    let report = Integrator::new()
        .timeout(timeout)
        .integrate("((x^64)^64)^40", 0, 1);
    assert!(started.elapsed() < timeout + Duration::from_millis(250));
    if let Err(err) = &report.outcome {
        assert_ne!(err.kind(), ErrorKind::Timeout);
    }
}

#[test]
fn test_stochastic_runs_are_bit_identical() {
    let integrator = Integrator::new()
        .disable(Method::SymbolicClosedForm)
        .disable(Method::AdaptiveQuadrature)
        .disable(Method::DiscreteSummationFallback);

    let first = integrator.integrate("sin(x)^2 + x", 0, 2).outcome.unwrap();
    let second = integrator.integrate("sin(x)^2 + x", 0, 2).outcome.unwrap();
    assert_eq!(first.method, Method::StochasticFallback);
    assert_eq!(first.value.to_bits(), second.value.to_bits());

    let exact = 2.0 + 1.0 - (4f64).sin() / 4.0;
    assert!((first.value - exact).abs() < 0.02 * exact);
    assert_eq!(first.error_estimate, Some(0.02 * first.value.abs()));
}

#[test]
fn test_quadrature_switch() {
    let report = Integrator::new()
        .quadrature(false)
        .integrate("exp(-x^2)", 0, 1);
    assert!(!report.diagnostics.quadrature_subsystem_available);
    let result = report.outcome.unwrap();
    assert_eq!(result.method, Method::DiscreteSummationFallback);
    assert!((result.value - 0.746_824_132_812_427).abs() < 1e-10);
}

#[test]
fn test_custom_limits() {
    let integrator = Integrator::new().limits(Limits {
        max_depth: 3,
        ..Limits::default()
    });
    let err = integrator.integrate("sin(cos(tan(exp(x))))", 0, 1).outcome.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);

    let integrator = Integrator::new().limits(Limits {
        max_subdivisions: 100,
        ..Limits::default()
    });
    let err = integrator
        .riemann_sum("x", 0, 1, 101, SamplingPolicy::Right)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Subdivision);
}
