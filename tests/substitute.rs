use fpexpr::{
    evaluate, extract_coefficients, int, is_horner, parse_expr, substitute, Coefficients, Config,
    Node, Real,
};

fn parse(input: &str) -> Node {
    parse_expr(input).expect("parse input")
}

fn value_at(tree: &Node, x: &Real) -> Real {
    evaluate(tree, x, 200)
}

#[test]
fn affine_substitution() {
    let cfg = Config::default();
    let r = substitute(&parse("x^2 + 1"), &parse("2*x + 3"), &cfg);
    assert!(is_horner(&r));
    let expected = Coefficients::new(vec![Some(int(10)), Some(int(12)), Some(int(4))]);
    assert_eq!(extract_coefficients(&r, &cfg), Some(expected));
}

#[test]
fn composition_matches_nested_evaluation() {
    let cfg = Config::default();
    let p = parse("x^3 - 2*x + 1");
    let q = parse("x^2 + x - 1");
    let r = substitute(&p, &q, &cfg);
    for n in -4..=4 {
        let x = Real::dyadic(n, -1);
        let expected = value_at(&p, &value_at(&q, &x));
        assert_eq!(value_at(&r, &x), expected, "at {x}");
    }
}

#[test]
fn large_compositions_substitute_structurally() {
    let cfg = Config::default();
    let p = parse("x^200 + 1");
    let q = parse("x^10 + x");
    let r = substitute(&p, &q, &cfg);
    assert_eq!(r, parse("(x^10 + x)^200 + 1"));
}

#[test]
fn constant_inner_polynomial_folds() {
    let cfg = Config::default();
    assert_eq!(substitute(&parse("x^2 + x"), &parse("3"), &cfg), int(12));
}

#[test]
fn non_polynomials_substitute_structurally() {
    let cfg = Config::default();
    let r = substitute(&parse("exp(x) * x"), &parse("x + 1"), &cfg);
    assert_eq!(r, parse("exp(x + 1) * (x + 1)"));
    let r = substitute(&parse("x^2"), &parse("sin(x)"), &cfg);
    assert_eq!(r, parse("sin(x)^2"));
}
