use crate::arithmetization::variable::Variable;
use crate::errors::{PlaceholderError, Result};
use ark_std::{boxed::Box, vec::Vec};
use placeholder_algebra::prelude::*;

/// A polynomial expression over table cells.
///
/// The same type describes gate constraints, lookup inputs and the values of
/// copy constraints; one evaluator serves both the per-row check of an
/// assignment and the per-point evaluation over an extended domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression<F> {
    /// A field constant.
    Constant(F),
    /// A single cell.
    Variable(Variable),
    /// Sum of two expressions.
    Add(Box<Expression<F>>, Box<Expression<F>>),
    /// Difference of two expressions.
    Sub(Box<Expression<F>>, Box<Expression<F>>),
    /// Product of two expressions.
    Mul(Box<Expression<F>>, Box<Expression<F>>),
    /// Negation.
    Neg(Box<Expression<F>>),
    /// Power with a constant exponent.
    Pow(Box<Expression<F>>, usize),
}

impl<F: Scalar> Expression<F> {
    /// Build a constant expression.
    pub fn constant(c: F) -> Self {
        Expression::Constant(c)
    }

    /// Raise to the power `n`.
    pub fn pow(self, n: usize) -> Self {
        Expression::Pow(Box::new(self), n)
    }

    /// Return the degree, counting every variable as degree one.
    pub fn max_degree(&self) -> usize {
        match self {
            Expression::Constant(_) => 0,
            Expression::Variable(_) => 1,
            Expression::Add(a, b) | Expression::Sub(a, b) => a.max_degree().max(b.max_degree()),
            Expression::Mul(a, b) => a.max_degree() + b.max_degree(),
            Expression::Neg(a) => a.max_degree(),
            Expression::Pow(a, n) => a.max_degree() * n,
        }
    }

    /// Visit every variable occurrence, duplicates included.
    pub fn for_each_variable<V: FnMut(&Variable)>(&self, visit: &mut V) {
        match self {
            Expression::Constant(_) => {}
            Expression::Variable(v) => visit(v),
            Expression::Add(a, b) | Expression::Sub(a, b) | Expression::Mul(a, b) => {
                a.for_each_variable(visit);
                b.for_each_variable(visit);
            }
            Expression::Neg(a) | Expression::Pow(a, _) => a.for_each_variable(visit),
        }
    }

    /// Return every variable occurrence, duplicates included.
    pub fn variables(&self) -> Vec<Variable> {
        let mut res = vec![];
        self.for_each_variable(&mut |v| res.push(*v));
        res
    }

    /// Evaluate with `env` providing the value of each variable.
    pub fn evaluate<E>(&self, env: &E) -> Result<F>
    where
        E: Fn(&Variable) -> Result<F>,
    {
        Ok(match self {
            Expression::Constant(c) => *c,
            Expression::Variable(v) => env(v)?,
            Expression::Add(a, b) => a.evaluate(env)?.add(&b.evaluate(env)?),
            Expression::Sub(a, b) => a.evaluate(env)?.sub(&b.evaluate(env)?),
            Expression::Mul(a, b) => a.evaluate(env)?.mul(&b.evaluate(env)?),
            Expression::Neg(a) => a.evaluate(env)?.neg(),
            Expression::Pow(a, n) => a.evaluate(env)?.pow(&[*n as u64]),
        })
    }

    /// Return `Some(true)` when every variable is relative, `Some(false)` when
    /// every variable is absolute and `None` when there is no variable.
    pub fn relativity(&self) -> Result<Option<bool>> {
        let mut relative = None;
        let mut mixed = false;
        self.for_each_variable(&mut |v| match relative {
            None => relative = Some(v.relative),
            Some(r) if r != v.relative => mixed = true,
            _ => {}
        });
        if mixed {
            Err(PlaceholderError::ExpressionRelativityMixed)
        } else {
            Ok(relative)
        }
    }

    /// Turn an absolute expression into a relative one around `base_row`,
    /// failing when a rotation would exceed `max_rotation` in absolute value.
    pub fn relativize(&self, base_row: usize, max_rotation: i32) -> Result<Self> {
        Ok(match self {
            Expression::Constant(c) => Expression::Constant(*c),
            Expression::Variable(v) => {
                if v.relative {
                    return Err(PlaceholderError::ExpressionRelativityMixed);
                }
                let rotation = v.rotation as i64 - base_row as i64;
                if rotation.abs() > max_rotation as i64 {
                    return Err(PlaceholderError::NotLocallyRelativizable);
                }
                Expression::Variable(Variable::new(v.column_type, v.index, rotation as i32))
            }
            Expression::Add(a, b) => Expression::Add(
                Box::new(a.relativize(base_row, max_rotation)?),
                Box::new(b.relativize(base_row, max_rotation)?),
            ),
            Expression::Sub(a, b) => Expression::Sub(
                Box::new(a.relativize(base_row, max_rotation)?),
                Box::new(b.relativize(base_row, max_rotation)?),
            ),
            Expression::Mul(a, b) => Expression::Mul(
                Box::new(a.relativize(base_row, max_rotation)?),
                Box::new(b.relativize(base_row, max_rotation)?),
            ),
            Expression::Neg(a) => Expression::Neg(Box::new(a.relativize(base_row, max_rotation)?)),
            Expression::Pow(a, n) => {
                Expression::Pow(Box::new(a.relativize(base_row, max_rotation)?), *n)
            }
        })
    }
}

impl<F> From<Variable> for Expression<F> {
    fn from(v: Variable) -> Self {
        Expression::Variable(v)
    }
}

impl<F: Scalar> From<F> for Expression<F> {
    fn from(c: F) -> Self {
        Expression::Constant(c)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl<F: Scalar, R: Into<Expression<F>>> $trait<R> for Expression<F> {
            type Output = Expression<F>;

            fn $method(self, rhs: R) -> Self::Output {
                Expression::$variant(Box::new(self), Box::new(rhs.into()))
            }
        }

        impl<F: Scalar> $trait<Expression<F>> for Variable {
            type Output = Expression<F>;

            fn $method(self, rhs: Expression<F>) -> Self::Output {
                Expression::$variant(Box::new(self.into()), Box::new(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);

impl<F: Scalar> Neg for Expression<F> {
    type Output = Expression<F>;

    fn neg(self) -> Self::Output {
        Expression::Neg(Box::new(self))
    }
}
