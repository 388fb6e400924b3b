use crate::ui::unit::{Axis, ResolveCtx, UiLength, UiSize};

/// Arithmetic operator for calc expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Operand of a calc expression: a unit value, a nested expression
/// (grouping), or a bare number.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcOperand {
    Size(UiSize),
    Calc(Box<UiCalc>),
    Number(f32),
}

/// A calc expression node.
///
/// Evaluation is strictly left to right with no operator precedence;
/// nesting expresses grouping. Both operands resolve fully to pixels
/// before the operator applies. Division by zero yields 0 and is reported
/// once per owning component.
#[derive(Debug, Clone, PartialEq)]
pub struct UiCalc {
    pub left: CalcOperand,
    pub op: CalcOp,
    pub right: CalcOperand,
}

impl UiCalc {
    #[must_use]
    pub fn new(left: impl Into<CalcOperand>, op: CalcOp, right: impl Into<CalcOperand>) -> Self {
        Self {
            left: left.into(),
            op: op.into(),
            right: right.into(),
        }
    }

    /// Evaluates to pixels. `divided_by_zero` is set (never cleared) when
    /// any division in the expression hits a zero divisor.
    #[must_use]
    pub fn evaluate(&self, ctx: &ResolveCtx, axis: Axis, divided_by_zero: &mut bool) -> f32 {
        let left = self.left.evaluate(ctx, axis, divided_by_zero);
        let right = self.right.evaluate(ctx, axis, divided_by_zero);

        match self.op {
            CalcOp::Add => left + right,
            CalcOp::Sub => left - right,
            CalcOp::Mul => left * right,
            CalcOp::Div => {
                if right == 0.0 {
                    *divided_by_zero = true;
                    0.0
                } else {
                    left / right
                }
            }
        }
    }
}

impl CalcOperand {
    fn evaluate(&self, ctx: &ResolveCtx, axis: Axis, divided_by_zero: &mut bool) -> f32 {
        match self {
            CalcOperand::Size(size) => size.resolve(ctx, axis),
            CalcOperand::Calc(calc) => calc.evaluate(ctx, axis, divided_by_zero),
            CalcOperand::Number(n) => *n,
        }
    }
}

impl UiLength {
    /// Resolves any authored length to pixels.
    #[must_use]
    pub fn resolve(&self, ctx: &ResolveCtx, axis: Axis, divided_by_zero: &mut bool) -> f32 {
        match self {
            UiLength::Size(size) => size.resolve(ctx, axis),
            UiLength::Calc(calc) => calc.evaluate(ctx, axis, divided_by_zero),
        }
    }
}

impl From<UiSize> for CalcOperand {
    fn from(size: UiSize) -> Self {
        CalcOperand::Size(size)
    }
}

impl From<UiLength> for CalcOperand {
    fn from(length: UiLength) -> Self {
        match length {
            UiLength::Size(size) => CalcOperand::Size(size),
            UiLength::Calc(calc) => CalcOperand::Calc(calc),
        }
    }
}

impl From<f32> for CalcOperand {
    fn from(n: f32) -> Self {
        CalcOperand::Number(n)
    }
}

impl From<UiCalc> for CalcOperand {
    fn from(calc: UiCalc) -> Self {
        CalcOperand::Calc(Box::new(calc))
    }
}
