use crate::error::{CoreError, Result};
use crate::expr::{Node, UnaryOp};
use crate::numeric::{Real, Round};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::take_while;
use nom::character::complete::{alpha1, char, digit0, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, map, opt, recognize};
use nom::error::VerboseError;
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, tuple};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Num, One, Pow};

/// Decimal literals that are not dyadic are rounded to nearest at this precision.
const DECIMAL_PRECISION: u32 = 165;

/// Parses an expression in the single free variable `x`.
///
/// `-` binds looser than `^`, so `-x^2` is `-(x^2)`, and `^` is right
/// associative. `1/3` is a division node, not a rational literal.
pub fn parse_expr(input: &str) -> Result<Node> {
    match all_consuming(ws(parse_add_sub))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(e) => Err(CoreError::Parse(format!("{e:?}"))),
    }
}

type Parsed<'a> = IResult<&'a str, Node, VerboseError<&'a str>>;

fn parse_add_sub(input: &str) -> Parsed<'_> {
    let (rest, init) = parse_mul_div(input)?;
    fold_many0(
        pair(ws(alt((char('+'), char('-')))), parse_mul_div),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '+' => crate::expr::add(acc, rhs),
            _ => crate::expr::sub(acc, rhs),
        },
    )(rest)
}

fn parse_mul_div(input: &str) -> Parsed<'_> {
    let (rest, init) = parse_unary(input)?;
    fold_many0(
        pair(ws(alt((char('*'), char('/')))), parse_unary),
        move || init.clone(),
        |acc, (op, rhs)| match op {
            '*' => crate::expr::mul(acc, rhs),
            _ => crate::expr::div(acc, rhs),
        },
    )(rest)
}

fn parse_unary(input: &str) -> Parsed<'_> {
    if let Ok((rest, expr)) = preceded(ws(char('-')), parse_unary)(input) {
        Ok((rest, crate::expr::neg(expr)))
    } else if let Ok((rest, expr)) = preceded(ws(char('+')), parse_unary)(input) {
        Ok((rest, expr))
    } else {
        parse_pow(input)
    }
}

fn parse_pow(input: &str) -> Parsed<'_> {
    let (rest, base) = parse_primary(input)?;
    if let Ok((next, exp)) = preceded(ws(char('^')), parse_unary)(rest) {
        Ok((next, crate::expr::pow(base, exp)))
    } else {
        Ok((rest, base))
    }
}

fn parse_primary(input: &str) -> Parsed<'_> {
    alt((parse_parens, parse_number, parse_word))(input)
}

fn parse_parens(input: &str) -> Parsed<'_> {
    delimited(ws(char('(')), parse_add_sub, ws(char(')')))(input)
}

/// Identifiers: the variable, named constants and unary functions.
fn parse_word(input: &str) -> Parsed<'_> {
    let (rest, name) = ws(recognize(pair(
        alt((alpha1, recognize(char('_')))),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    )))(input)?;
    match name {
        "x" | "_x_" => Ok((rest, Node::Variable)),
        "pi" => Ok((rest, Node::Pi)),
        "nan" | "NaN" => Ok((rest, Node::nan())),
        "infty" | "inf" => Ok((rest, Node::Constant(Real::infinity(false, DECIMAL_PRECISION)))),
        _ => match UnaryOp::from_name(name).filter(|op| *op != UnaryOp::Neg) {
            Some(op) => map(parse_parens, move |arg| Node::unary(op, arg))(rest),
            None => Err(nom::Err::Error(VerboseError {
                errors: vec![(
                    input,
                    nom::error::VerboseErrorKind::Context("unknown identifier"),
                )],
            })),
        },
    }
}

/// Integers, decimals and scientific notation. Dyadic values are exact.
fn parse_number(input: &str) -> Parsed<'_> {
    let (rest, text) = ws(recognize(tuple((
        digit1,
        opt(pair(char('.'), digit0)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    ))))(input)?;
    Ok((rest, Node::Constant(decimal(text))))
}

fn decimal(text: &str) -> Real {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(i) => (&text[..i], text[i + 1..].parse::<i64>().unwrap_or(0)),
        None => (text, 0),
    };
    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits: BigInt = BigInt::from_str_radix(&format!("{whole}{frac}"), 10).unwrap_or_default();
    let scale = exponent - frac.len() as i64;
    let ten = BigInt::from(10);
    let value = if scale >= 0 {
        BigRational::from_integer(digits * Pow::pow(&ten, scale as u64))
    } else {
        BigRational::new(digits, Pow::pow(&ten, scale.unsigned_abs()))
    };
    if value.denom().is_one() {
        return Real::from_int(value.to_integer());
    }
    let r = Real::from_rational(&value, DECIMAL_PRECISION, Round::Nearest);
    if !r.exact {
        tracing::warn!(literal = text, precision = DECIMAL_PRECISION, "decimal literal rounded");
    }
    r.value
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, VerboseError<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, int, mul, neg, pow, sub, var};

    #[test]
    fn precedence_and_associativity() {
        let tree = parse_expr("3*x^2 - 2").expect("parse input");
        assert_eq!(tree, sub(mul(int(3), pow(var(), int(2))), int(2)));
        let tree = parse_expr("-x^2").expect("parse input");
        assert_eq!(tree, neg(pow(var(), int(2))));
        let tree = parse_expr("2^3^2").expect("parse input");
        assert_eq!(tree, pow(int(2), pow(int(3), int(2))));
    }

    #[test]
    fn literals() {
        let tree = parse_expr("0.25 + x").expect("parse input");
        assert_eq!(tree, add(Node::Constant(Real::dyadic(1, -2)), var()));
        assert_eq!(parse_expr("1e3").expect("parse input"), int(1000));
        assert!(parse_expr("nan").expect("parse input").is_nan());
    }

    #[test]
    fn functions_and_errors() {
        let tree = parse_expr("log1p(x)").expect("parse input");
        assert_eq!(tree, Node::log1p(var()));
        assert!(parse_expr("y + 1").is_err());
        assert!(parse_expr("sin(").is_err());
    }
}
