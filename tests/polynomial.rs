use fpexpr::{
    degree, evaluate, extract_coefficients, extract_coefficients_with, get_ith_coefficient,
    get_subpolynomial, int, is_canonical, is_horner, is_polynomial, make_polynomial,
    max_power_divider, parse_expr, power, to_canonical, to_horner, Coefficients, Config, Node, Real,
    Strategy,
};

fn parse(input: &str) -> Node {
    parse_expr(input).expect("parse input")
}

fn ints(values: &[i64]) -> Coefficients {
    Coefficients::new(values.iter().map(|v| Some(int(*v))).collect())
}

fn value_at(tree: &Node, x: i64) -> Real {
    evaluate(tree, &Real::from_int(x), 200)
}

#[test]
fn classification() {
    assert!(is_polynomial(&parse("x / 2 - 3 * x^2")));
    assert!(is_polynomial(&parse("x^(4/2)")));
    assert!(is_polynomial(&parse("pi * x + sin(1)")));
    assert!(!is_polynomial(&parse("2 / x")));
    assert!(!is_polynomial(&parse("x^(1/2)")));
    assert!(!is_polynomial(&parse("sin(x)")));
}

#[test]
fn syntactic_degree() {
    assert_eq!(degree(&parse("x^3 - 2*x")), Some(3));
    assert_eq!(degree(&parse("(x + 1) * (x^2 + 1)")), Some(3));
    assert_eq!(degree(&parse("x - x")), Some(1));
    assert_eq!(degree(&parse("7")), Some(0));
    assert_eq!(degree(&parse("exp(x)")), None);
}

#[test]
fn strategies_agree() {
    let cfg = Config::default();
    let tree = parse("(x + 2)^3 - x * (x - 1)");
    let expected = Some(ints(&[8, 13, 5, 1]));
    assert_eq!(extract_coefficients(&tree, &cfg), expected);
    assert_eq!(extract_coefficients_with(&tree, Strategy::Recursive, &cfg), expected);
    assert_eq!(extract_coefficients_with(&tree, Strategy::Expanded, &cfg), expected);
    assert_eq!(extract_coefficients_with(&tree, Strategy::Horner, &cfg), None);
    assert_eq!(extract_coefficients_with(&tree, Strategy::Canonical, &cfg), None);
}

#[test]
fn normal_form_round_trip() {
    let cfg = Config::default();
    for d in 0..=10usize {
        let coeffs = (0..=d)
            .map(|i| Real::from_int((i as i64 * 7) % 11 - 5))
            .collect::<Vec<_>>();
        let horner = make_polynomial(&coeffs);
        assert!(is_horner(&horner));
        let canonical = to_canonical(&horner, &cfg);
        assert!(is_canonical(&canonical), "{canonical}");
        assert_eq!(
            extract_coefficients(&canonical, &cfg),
            extract_coefficients(&horner, &cfg)
        );
        assert_eq!(to_horner(&canonical, &cfg), horner);
        for x in -3..=3 {
            assert_eq!(value_at(&canonical, x), value_at(&horner, x));
        }
    }
}

#[test]
fn normal_forms_descend_into_other_trees() {
    let cfg = Config::default();
    let tree = parse("sin(1 + 2*x + 3*x^2)");
    assert_eq!(to_horner(&tree, &cfg), parse("sin(1 + x * (2 + x * 3))"));
    assert_eq!(to_canonical(&parse("x * (2 + x * 3)"), &cfg), parse("2 * x + 3 * x^2"));
}

#[test]
fn coefficient_access() {
    let cfg = Config::default();
    let tree = parse("1 + 2*x + 3*x^2");
    assert_eq!(get_ith_coefficient(&tree, 1, &cfg), Some(int(2)));
    assert_eq!(get_ith_coefficient(&tree, 5, &cfg), Some(int(0)));
    assert_eq!(get_ith_coefficient(&parse("sin(x)"), 0, &cfg), None);

    let symbolic = parse("pi * x^2 + x");
    assert_eq!(get_ith_coefficient(&symbolic, 2, &cfg), Some(parse("pi")));
}

#[test]
fn subpolynomials() {
    let cfg = Config::default();
    let p = make_polynomial(&[1, 2, 3, 4, 5].map(Real::from_int));
    let low = get_subpolynomial(&p, &[0, 2], false, &cfg).expect("polynomial input");
    assert_eq!(value_at(&low, 2), Real::from_int(13));
    let filled = get_subpolynomial(&p, &[0, 2], true, &cfg).expect("polynomial input");
    assert_eq!(value_at(&filled, 2), Real::from_int(125));
    let none = get_subpolynomial(&p, &[], true, &cfg).expect("polynomial input");
    assert!(none.is_zero());
}

#[test]
fn powers_and_dividers() {
    let cfg = Config::default();
    let cube = power(&parse("1 + x"), 3, &cfg).expect("polynomial input");
    assert!(is_horner(&cube));
    assert_eq!(extract_coefficients(&cube, &cfg), Some(ints(&[1, 3, 3, 1])));
    assert_eq!(value_at(&cube, 2), Real::from_int(27));

    assert_eq!(max_power_divider(&parse("x^2 + x^3"), &cfg), Some(2));
    assert_eq!(max_power_divider(&parse("1 + x"), &cfg), Some(0));
    assert_eq!(max_power_divider(&parse("x - x"), &cfg), None);
    assert_eq!(max_power_divider(&parse("exp(x)"), &cfg), None);
}

#[test]
fn huge_degrees_stay_symbolic() {
    let cfg = Config::default();
    let tree = parse("x^1000000000 + x^7");
    assert_eq!(degree(&tree), Some(1_000_000_000));
    assert_eq!(extract_coefficients(&tree, &cfg), None);
    assert_eq!(get_ith_coefficient(&tree, 7, &cfg), None);
    assert_eq!(to_horner(&tree, &cfg), tree);
    assert_eq!(max_power_divider(&tree, &cfg), Some(7));
    assert_eq!(power(&parse("x + 1"), 100_000, &cfg), None);
    assert!(power(&parse("x + 1"), 64, &cfg).is_some_and(|p| is_horner(&p)));
}

#[test]
fn empty_coefficient_list_is_zero() {
    assert!(make_polynomial(&[]).is_zero());
    assert_eq!(make_polynomial(&[Real::from_int(7)]), int(7));
}
