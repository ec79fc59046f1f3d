//! Symbolic parameter expressions.
//!
//! Rotation angles may be given as concrete values or as symbols bound
//! later, before execution. Backends refuse circuits that still carry
//! unbound symbols at submit time.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

/// A symbolic or concrete parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A concrete value.
    Constant(f64),
    /// A named symbol.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// A concrete parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// A named symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// The constant π.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Whether the expression still contains symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Evaluate to a concrete value, if no symbols remain.
    ///
    /// Division by an exact zero yields `None` rather than an infinity.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(std::ops::Neg::neg),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// All symbol names appearing in the expression, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) => e.collect_symbols(set),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Substitute every symbol found in `bindings`, leaving unknown
    /// symbols in place, and fold constant subexpressions.
    pub fn bind(&self, bindings: &FxHashMap<String, f64>) -> Self {
        let substituted = self.substitute(bindings);
        substituted.simplify()
    }

    fn substitute(&self, bindings: &FxHashMap<String, f64>) -> Self {
        match self {
            ParameterExpression::Symbol(name) => match bindings.get(name) {
                Some(v) => ParameterExpression::Constant(*v),
                None => self.clone(),
            },
            ParameterExpression::Constant(_) | ParameterExpression::Pi => self.clone(),
            ParameterExpression::Neg(e) => {
                ParameterExpression::Neg(Box::new(e.substitute(bindings)))
            }
            ParameterExpression::Add(a, b) => ParameterExpression::Add(
                Box::new(a.substitute(bindings)),
                Box::new(b.substitute(bindings)),
            ),
            ParameterExpression::Sub(a, b) => ParameterExpression::Sub(
                Box::new(a.substitute(bindings)),
                Box::new(b.substitute(bindings)),
            ),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(
                Box::new(a.substitute(bindings)),
                Box::new(b.substitute(bindings)),
            ),
            ParameterExpression::Div(a, b) => ParameterExpression::Div(
                Box::new(a.substitute(bindings)),
                Box::new(b.substitute(bindings)),
            ),
        }
    }

    /// Fold constant subexpressions into `Constant` nodes.
    pub fn simplify(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return ParameterExpression::Constant(v);
        }
        match self {
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.simplify())),
            ParameterExpression::Add(a, b) => {
                ParameterExpression::Add(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            ParameterExpression::Sub(a, b) => {
                ParameterExpression::Sub(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            ParameterExpression::Mul(a, b) => {
                ParameterExpression::Mul(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            ParameterExpression::Div(a, b) => {
                ParameterExpression::Div(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "pi"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

impl From<&str> for ParameterExpression {
    fn from(name: &str) -> Self {
        ParameterExpression::Symbol(name.to_string())
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParameterExpression::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, f64)]) -> FxHashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn constant_evaluates() {
        let p = ParameterExpression::constant(1.5);
        assert!(!p.is_symbolic());
        assert_eq!(p.as_f64(), Some(1.5));
    }

    #[test]
    fn symbol_is_symbolic() {
        let p = ParameterExpression::symbol("theta");
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);
        assert!(p.symbols().contains("theta"));
    }

    #[test]
    fn pi_constant() {
        assert_eq!(ParameterExpression::pi().as_f64(), Some(PI));
    }

    #[test]
    fn bind_replaces_known_symbols() {
        let p = ParameterExpression::symbol("theta") + ParameterExpression::symbol("phi");
        let bound = p.bind(&bindings(&[("theta", PI / 2.0)]));
        assert!(bound.is_symbolic());
        assert_eq!(bound.symbols().len(), 1);

        let fully = bound.bind(&bindings(&[("phi", PI / 2.0)]));
        assert!((fully.as_f64().unwrap() - PI).abs() < 1e-12);
    }

    #[test]
    fn division_by_zero_is_none() {
        let p = ParameterExpression::constant(1.0) / ParameterExpression::constant(0.0);
        assert_eq!(p.as_f64(), None);
    }

    #[test]
    fn simplify_folds_constants() {
        let p = (ParameterExpression::constant(2.0) * ParameterExpression::pi()).simplify();
        assert_eq!(p, ParameterExpression::Constant(2.0 * PI));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bind_then_eval_matches_direct_eval(a in -10.0..10.0f64, b in -10.0..10.0f64) {
                let expr = ParameterExpression::symbol("a") * ParameterExpression::symbol("b")
                    + ParameterExpression::symbol("a");
                let bound = expr.bind(&bindings(&[("a", a), ("b", b)]));
                let direct = a * b + a;
                prop_assert!((bound.as_f64().unwrap() - direct).abs() < 1e-9);
            }

            #[test]
            fn simplify_preserves_value(a in -10.0..10.0f64) {
                let expr = (ParameterExpression::constant(a) + ParameterExpression::pi())
                    * ParameterExpression::constant(2.0);
                let simplified = expr.simplify();
                prop_assert_eq!(expr.as_f64(), simplified.as_f64());
            }
        }
    }
}
