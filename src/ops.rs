use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::Error;
use crate::reference::Ref;
use crate::session::Session;

pub struct AddOp {
    a: Ref,
    b: Ref,
}

impl Add for Ref {
    type Output = AddOp;

    fn add(self, rhs: Self) -> Self::Output {
        AddOp { a: self, b: rhs }
    }
}

pub struct SubOp {
    a: Ref,
    b: Ref,
}

impl Sub for Ref {
    type Output = SubOp;

    fn sub(self, rhs: Self) -> Self::Output {
        SubOp { a: self, b: rhs }
    }
}

pub struct MulOp {
    a: Ref,
    b: Ref,
}

impl Mul for Ref {
    type Output = MulOp;

    fn mul(self, rhs: Self) -> Self::Output {
        MulOp { a: self, b: rhs }
    }
}

pub struct DivOp {
    a: Ref,
    b: Ref,
}

impl Div for Ref {
    type Output = DivOp;

    fn div(self, rhs: Self) -> Self::Output {
        DivOp { a: self, b: rhs }
    }
}

pub struct NegOp {
    a: Ref,
}

impl Neg for Ref {
    type Output = NegOp;

    fn neg(self) -> Self::Output {
        NegOp { a: self }
    }
}

/// Deferred expression that a [`Session`] can build.
pub trait Build {
    fn build(&self, session: &Session) -> Result<Ref, Error>;
}

impl Session {
    /// Build `value`, e.g. `session.build(x * y)`.
    pub fn build(&self, value: impl Build) -> Result<Ref, Error> {
        value.build(self)
    }
}

impl Build for Ref {
    fn build(&self, session: &Session) -> Result<Ref, Error> {
        session.check(*self)?;
        Ok(*self)
    }
}

impl Build for AddOp {
    fn build(&self, session: &Session) -> Result<Ref, Error> {
        session.apply_add(self.a, self.b)
    }
}

impl Build for SubOp {
    fn build(&self, session: &Session) -> Result<Ref, Error> {
        session.apply_sub(self.a, self.b)
    }
}

impl Build for MulOp {
    fn build(&self, session: &Session) -> Result<Ref, Error> {
        session.apply_mult(self.a, self.b)
    }
}

impl Build for DivOp {
    fn build(&self, session: &Session) -> Result<Ref, Error> {
        session.apply_div(self.a, self.b)
    }
}

impl Build for NegOp {
    fn build(&self, session: &Session) -> Result<Ref, Error> {
        session.apply_neg(self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn setup() -> (Session, Ref, Ref) {
        let s = Session::new();
        let x = s.mk_var(2, &[0.0], &[1.0]).unwrap();
        let c = s.constant(&[2.0, 3.0]).unwrap();
        (s, x, c)
    }

    #[test]
    fn test_build_ref() {
        let (s, x, _) = setup();
        assert_eq!(s.build(x).unwrap(), x);
    }

    #[test]
    fn test_build_neg() {
        let (s, x, _) = setup();
        let f = s.build(-x).unwrap();
        assert_eq!(s.node(f), s.node(s.apply_neg(x).unwrap()));
    }

    #[test]
    fn test_build_binary() {
        let (s, x, c) = setup();
        let p = [0.5, 0.25];
        let cases: [(Ref, Vec<f64>); 4] = [
            (s.build(x + c).unwrap(), vec![2.5, 3.25]),
            (s.build(x - c).unwrap(), vec![-1.5, -2.75]),
            (s.build(x * c).unwrap(), vec![1.0, 0.75]),
            (s.build(x / c).unwrap(), vec![0.25, 0.25 / 3.0]),
        ];
        for (f, expected) in cases {
            assert_eq!(s.evaluate(f, &p, &p).unwrap(), expected);
        }
    }

    #[test]
    fn test_build_propagates_errors() {
        let (s, x, _) = setup();
        let y = s.mk_var(3, &[0.0], &[1.0]).unwrap();
        assert!(matches!(
            s.build(x + y),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
