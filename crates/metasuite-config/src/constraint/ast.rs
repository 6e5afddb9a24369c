//! Abstract syntax tree for version constraint expressions.

use std::fmt;

use crate::version::Version;

/// One of the six comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
}

impl Comparator {
    /// Applies the operator to an ordered pair.
    #[must_use]
    pub fn apply(self, lhs: &Version, rhs: &Version) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
        }
    }

    /// The operator's source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A comparison operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// The `version` keyword, bound to the subject at evaluation time.
    Subject,
    /// A version literal.
    Literal(Version),
}

impl Operand {
    fn bind<'a>(&'a self, subject: &'a Version) -> &'a Version {
        match self {
            Self::Subject => subject,
            Self::Literal(v) => v,
        }
    }
}

/// A parsed constraint expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `lhs <op> rhs`
    Compare {
        /// Left operand.
        lhs: Operand,
        /// Operator.
        op: Comparator,
        /// Right operand.
        rhs: Operand,
    },
    /// Both sides must hold.
    And(Box<Expr>, Box<Expr>),
    /// Either side must hold.
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluates the expression with `version` bound to `subject`.
    ///
    /// `and` and `or` short-circuit.
    #[must_use]
    pub fn evaluate(&self, subject: &Version) -> bool {
        match self {
            Self::Compare { lhs, op, rhs } => op.apply(lhs.bind(subject), rhs.bind(subject)),
            Self::And(l, r) => l.evaluate(subject) && r.evaluate(subject),
            Self::Or(l, r) => l.evaluate(subject) || r.evaluate(subject),
        }
    }
}
