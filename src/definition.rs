use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use strum::IntoDiscriminant;
use strum_macros::EnumDiscriminants;

use crate::schema::{Attribute, which};

/// One operation of a compiled derived-attribute definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(DefOpKind))]
pub enum DefOp {
    /// Reference to another attribute, by table index.
    Attribute(usize),
    Number(f64),
    Str(String),
    /// Operator or function text the schema reader does not interpret.
    Op(String),
    End,
}

/// Compiled definition of a derived attribute: a flat operation sequence
/// terminated by `End`. Nothing beyond the iterator is part of the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionTree {
    ops: Vec<DefOp>,
}

impl ExpressionTree {
    pub fn new(mut ops: Vec<DefOp>) -> Self {
        if !ops.contains(&DefOp::End) {
            ops.push(DefOp::End);
        }
        Self { ops }
    }

    /// Operations up to, and not including, the first `End`.
    pub fn iter(&self) -> impl Iterator<Item = &DefOp> {
        self.ops
            .iter()
            .take_while(|op| op.discriminant() != DefOpKind::End)
    }
}

/// Attribute indices referenced by `definition`, deduplicated and ordered by
/// index. `att_count` bounds the presence set.
pub fn atts_used(definition: &ExpressionTree, att_count: usize) -> Vec<usize> {
    let mut used = vec![false; att_count];
    for op in definition.iter() {
        if let DefOp::Attribute(att) = op {
            if *att < att_count {
                used[*att] = true;
            }
        }
    }
    used.iter()
        .enumerate()
        .filter_map(|(att, &referenced)| referenced.then_some(att))
        .collect()
}

/// Turns the raw definition source of a derived attribute into an
/// `ExpressionTree`, resolving attribute references against the attributes
/// declared so far.
pub trait ExpressionCompiler {
    fn compile(&mut self, source: &str, attributes: &[Attribute]) -> anyhow::Result<ExpressionTree>;
}

/// Lexical reference implementation of `ExpressionCompiler`.
///
/// The definition grammar is not interpreted here: the source is tokenized
/// into numbers, double-quoted strings, words and operator text, and words
/// matching a declared attribute name become attribute references. That is
/// enough for dependency analysis; evaluation lives outside this crate.
#[derive(Debug, Default)]
pub struct FormulaCompiler;

impl ExpressionCompiler for FormulaCompiler {
    fn compile(&mut self, source: &str, attributes: &[Attribute]) -> anyhow::Result<ExpressionTree> {
        let chars: Vec<char> = source.chars().collect();
        let mut ops = vec![];
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == ' ' || c == '\t' {
                i += 1;
                continue;
            }

            if c == '"' {
                let mut literal = String::new();
                let mut j = i + 1;
                loop {
                    if j >= chars.len() {
                        return Err(anyhow!("unterminated string in definition `{}`", source));
                    }
                    match chars[j] {
                        '"' => break,
                        '\\' if j + 1 < chars.len() => {
                            literal.push(chars[j + 1]);
                            j += 2;
                        }
                        other => {
                            literal.push(other);
                            j += 1;
                        }
                    }
                }
                ops.push(DefOp::Str(literal));
                i = j + 1;
                continue;
            }

            if c.is_ascii_digit()
                || (c == '.' && chars.get(i + 1).is_some_and(|next| next.is_ascii_digit()))
            {
                let start = i;
                i += 1;
                while i < chars.len() {
                    let next = chars[i];
                    if next.is_ascii_digit() || next == '.' || next == 'e' || next == 'E' {
                        i += 1;
                    } else if (next == '+' || next == '-') && matches!(chars[i - 1], 'e' | 'E') {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let lexeme: String = chars[start..i].iter().collect();
                let number = lexeme
                    .parse::<f64>()
                    .map_err(|_| anyhow!("invalid number `{}` in definition", lexeme))?;
                ops.push(DefOp::Number(number));
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match which(&word, attributes, 0, attributes.len()) {
                    Some(att) => ops.push(DefOp::Attribute(att)),
                    None => ops.push(DefOp::Op(word)),
                }
                continue;
            }

            let pair: String = chars[i..(i + 2).min(chars.len())].iter().collect();
            if matches!(pair.as_str(), "<=" | ">=" | "!=" | "==" | "<>" | "&&" | "||") {
                ops.push(DefOp::Op(pair));
                i += 2;
            } else {
                ops.push(DefOp::Op(c.to_string()));
                i += 1;
            }
        }

        Ok(ExpressionTree::new(ops))
    }
}
