use fpexpr::{
    differentiate, differentiate_n, evaluate, parse_expr, simplify_errorfree, var, Config,
    FunctionRef, Interval, LibraryFunction, Node, Real,
};

fn parse(input: &str) -> Node {
    parse_expr(input).expect("parse input")
}

fn derivative_at(input: &str, x: f64) -> f64 {
    let d = differentiate(&parse(input), &Config::default());
    evaluate(&d, &Real::from_f64(x), 64).to_f64()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-14 * (1.0 + expected.abs()),
        "{actual} != {expected}"
    );
}

struct Opaque;

impl LibraryFunction for Opaque {
    fn name(&self) -> &str {
        "opaque"
    }

    fn evaluate(&self, x: &Interval, _order: u32, _precision: u32) -> Interval {
        x.clone()
    }
}

#[test]
fn polynomial_derivative_simplifies_to_the_expected_tree() {
    let cfg = Config::default();
    let d = differentiate(&parse("x^3 - 2*x + 1"), &cfg);
    assert_eq!(simplify_errorfree(&d, &cfg), parse("3*x^2 - 2"));
}

#[test]
fn huge_degrees_use_the_power_rule() {
    let d = differentiate(&parse("x^1000000000"), &Config::default());
    assert_eq!(d, parse("1000000000 * x^999999999"));
    assert_close(derivative_at("x^1000000000", 1.0), 1e9);
}

#[test]
fn sine_and_cosine() {
    assert_close(derivative_at("sin(x)", 0.0), 1.0);
    assert!(derivative_at("sin(x)", std::f64::consts::FRAC_PI_2).abs() < 1e-15);
    assert_close(derivative_at("cos(x)", 1.0), -1f64.sin());
    assert_close(derivative_at("tan(x)", 0.5), 1.0 / 0.5f64.cos().powi(2));
}

#[test]
fn quotient_and_power_rules() {
    assert_close(derivative_at("1 / x", 2.0), -0.25);
    assert_close(derivative_at("x / (x + 1)", 1.0), 0.25);
    assert_close(derivative_at("2^x", 0.0), std::f64::consts::LN_2);
    assert_close(derivative_at("x^x", 1.0), 1.0);
    assert_close(derivative_at("sqrt(x)", 4.0), 0.25);
}

#[test]
fn inverse_and_special_functions() {
    assert_close(derivative_at("log(x)", 2.0), 0.5);
    assert_close(derivative_at("atan(x)", 1.0), 0.5);
    assert_close(derivative_at("asin(x)", 0.0), 1.0);
    assert_close(derivative_at("log1p(x)", 1.0), 0.5);
    assert_close(derivative_at("erf(x)", 0.0), 2.0 / std::f64::consts::PI.sqrt());
    assert_close(derivative_at("erfc(x)", 0.0), -2.0 / std::f64::consts::PI.sqrt());
}

#[test]
fn chain_rule_on_nested_arguments() {
    // d/dx exp(sin(x^2)) = 2x cos(x^2) exp(sin(x^2))
    let expected = 2.0 * 1f64.cos() * 1f64.sin().exp();
    assert_close(derivative_at("exp(sin(x^2))", 1.0), expected);
}

#[test]
fn repeated_derivatives() {
    let cfg = Config::default();
    let d2 = differentiate_n(&parse("x^4"), 2, &cfg);
    assert_eq!(evaluate(&d2, &Real::from_int(2), 53), Real::from_int(48));
    let d4 = differentiate_n(&parse("x^4"), 4, &cfg);
    assert_eq!(evaluate(&d4, &Real::from_int(7), 53), Real::from_int(24));
    let d0 = differentiate_n(&parse("sin(x)"), 0, &cfg);
    assert_eq!(d0, parse("sin(x)"));
}

#[test]
fn hosted_functions_raise_their_order() {
    let f = FunctionRef::new(Opaque);
    let tree = Node::library_function(f.clone(), 0, var());
    let d = differentiate(&tree, &Config::default());
    assert_eq!(d, Node::library_function(f, 1, var()));
}
