//! Label-based assembler producing [`Program`]s.

use std::collections::HashMap;

use crate::abi::{codec, Selector, Token};
use crate::runtime::runtime_types::{Op, Program, RuntimeError};

enum Item {
    Op(Op),
    Jump(String),
    JumpI(String),
}

/// Builds one instruction list. Jump targets are resolved by `finish`.
#[derive(Default)]
pub struct Assembler {
    items: Vec<Item>,
    labels: HashMap<String, u32>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(&mut self, op: Op) -> &mut Self {
        self.items.push(Item::Op(op));
        self
    }

    pub fn push_token(&mut self, token: Token) -> &mut Self {
        self.op(Op::Push(codec::encode(&[token])))
    }

    pub fn label(&mut self, name: &str) -> &mut Self {
        self.labels.insert(name.to_string(), self.items.len() as u32);
        self
    }

    pub fn jump(&mut self, label: &str) -> &mut Self {
        self.items.push(Item::Jump(label.to_string()));
        self
    }

    pub fn jump_if(&mut self, label: &str) -> &mut Self {
        self.items.push(Item::JumpI(label.to_string()));
        self
    }

    /// Revert with a string reason.
    pub fn revert(&mut self, reason: &str) -> &mut Self {
        self.push_token(Token::String(reason.to_string())).op(Op::Revert)
    }

    /// Selector dispatch: jump to the label paired with the calldata's
    /// selector, revert when none matches.
    pub fn dispatch(&mut self, routes: &[(Selector, &str)]) -> &mut Self {
        for (sel, label) in routes {
            self.op(Op::Selector).op(Op::Push(sel.to_vec())).op(Op::Eq).jump_if(label);
        }
        self.revert("unknown function selector")
    }

    pub fn finish(self) -> Result<Vec<Op>, RuntimeError> {
        let resolve = |name: &str| {
            self.labels
                .get(name)
                .copied()
                .ok_or_else(|| RuntimeError::InvalidProgram(format!("undefined label {:?}", name)))
        };
        self.items
            .iter()
            .map(|item| match item {
                Item::Op(op) => Ok(op.clone()),
                Item::Jump(l) => resolve(l).map(Op::Jump),
                Item::JumpI(l) => resolve(l).map(Op::JumpI),
            })
            .collect()
    }
}

/// Assemble a constructor and a body into a program.
pub fn program(constructor: Assembler, body: Assembler) -> Result<Program, RuntimeError> {
    Ok(Program { constructor: constructor.finish()?, body: body.finish()? })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_resolve() {
        let mut a = Assembler::new();
        a.jump("end").op(Op::Pop).label("end").op(Op::Stop);
        assert_eq!(a.finish().unwrap(), vec![Op::Jump(2), Op::Pop, Op::Stop]);
    }

    #[test]
    fn test_undefined_label() {
        let mut a = Assembler::new();
        a.jump("nowhere");
        assert!(a.finish().is_err());
    }

    #[test]
    fn test_dispatch_layout() {
        let mut a = Assembler::new();
        a.dispatch(&[([1, 2, 3, 4], "f")]).label("f").op(Op::Stop);
        let ops = a.finish().unwrap();
        assert_eq!(ops[0], Op::Selector);
        assert_eq!(ops[3], Op::JumpI(6));
        assert_eq!(ops[5], Op::Revert);
    }
}
