use std::io::BufRead;

use chrono::Datelike;

use crate::definition::{ExpressionCompiler, FormulaCompiler, atts_used};
use crate::diagnostics::{DiagnosticKind, Diagnostics, NamesError};
use crate::scanner::{Delimiter, MAX_NAME, NameScanner};
use crate::schema::{Attribute, AttributeKind, AttributeTable, ValueList, which};

/// Reads a whole names file and assembles the attribute table.
///
/// Recoverable problems accumulate so one pass surfaces as many as possible;
/// any recorded diagnostic fails the load as a whole, and callers never see a
/// partially valid table.
pub struct NamesParser<R, C = FormulaCompiler> {
    scanner: NameScanner<R>,
    compiler: C,
    diags: Diagnostics,
    attributes: Vec<Attribute>,
    label_att: Option<usize>,
    case_weight_att: Option<usize>,
    max_discrete_values: usize,
    timestamp_base_year: Option<i32>,
}

impl<R: BufRead> NamesParser<R, FormulaCompiler> {
    pub fn new(source: R) -> Self {
        Self::with_compiler(source, FormulaCompiler)
    }
}

impl<R: BufRead, C: ExpressionCompiler> NamesParser<R, C> {
    /// Parser using a caller-supplied compiler for `:=` definitions.
    pub fn with_compiler(source: R, compiler: C) -> Self {
        Self {
            scanner: NameScanner::new(source),
            compiler,
            diags: Diagnostics::default(),
            attributes: vec![],
            label_att: None,
            case_weight_att: None,
            max_discrete_values: 0,
            timestamp_base_year: None,
        }
    }

    pub fn parse(mut self) -> anyhow::Result<AttributeTable> {
        self.load()
    }

    fn fail(&mut self) -> anyhow::Error {
        NamesError::new(std::mem::take(&mut self.diags).into_items()).into()
    }

    fn load(&mut self) -> anyhow::Result<AttributeTable> {
        // The target attribute is named up front but declared later like any
        // other attribute.
        let target_name = self
            .scanner
            .read_name(MAX_NAME, true, &mut self.diags)?
            .unwrap_or_default();
        log::debug!("target attribute name: `{}`", target_name);

        self.attributes = Vec::with_capacity(100);

        while let Some(name) = self.scanner.read_name(MAX_NAME, true, &mut self.diags)? {
            let delimiter = self.scanner.delimiter();
            if delimiter != Delimiter::Colon && delimiter != Delimiter::Assign {
                self.diags.report(
                    DiagnosticKind::BadAttributeName,
                    self.scanner.line(),
                    &name,
                    "",
                );
            }

            if let Some(include) = directive_mode(&name) {
                self.attribute_directive(include)?;
                break;
            }

            if which(&name, &self.attributes, 0, self.attributes.len()).is_some() {
                self.diags.report(
                    DiagnosticKind::DuplicateAttributeName,
                    self.scanner.line(),
                    &name,
                    "",
                );
            }

            self.attributes.push(Attribute::new(name));

            if delimiter == Delimiter::Assign {
                self.implicit_att()?;
            } else {
                self.explicit_att()?;
            }

            let att = self.attributes.len() - 1;
            if self.attributes[att].name == "case weight" {
                self.case_weight_att = Some(att);
                if !self.attributes[att].is_continuous() {
                    self.diags.report(
                        DiagnosticKind::CaseWeightNotContinuous,
                        self.scanner.line(),
                        "case weight",
                        "",
                    );
                }
            }
        }

        self.finish(&target_name)
    }

    /// `attributes ... included/excluded`: bulk-toggle the skip flags of
    /// already-declared attributes. Consumes the remainder of the file.
    fn attribute_directive(&mut self, include: bool) -> anyhow::Result<()> {
        if include {
            for att in self.attributes.iter_mut() {
                att.skip = true;
            }
        }

        while let Some(name) = self.scanner.read_name(MAX_NAME, true, &mut self.diags)? {
            match which(&name, &self.attributes, 0, self.attributes.len()) {
                Some(att) => self.attributes[att].skip = !include,
                None => self.diags.report(
                    DiagnosticKind::UnknownAttributeInDirective,
                    self.scanner.line(),
                    &name,
                    "",
                ),
            }
        }

        Ok(())
    }

    /// Type keyword or explicit discrete value list following `name:`.
    fn explicit_att(&mut self) -> anyhow::Result<()> {
        let att = self.attributes.len() - 1;

        let Some(first) = self.scanner.read_name(MAX_NAME, true, &mut self.diags)? else {
            self.diags.report(
                DiagnosticKind::EndOfInputInAttribute,
                self.scanner.line(),
                &self.attributes[att].name,
                "",
            );
            return Err(self.fail());
        };

        if self.scanner.delimiter() != Delimiter::Comma {
            match first.as_str() {
                "continuous" => {}
                "timestamp" => {
                    self.attributes[att].kind = AttributeKind::Timestamp;
                    // The epoch base year is shared by every timestamp
                    // attribute of the schema.
                    if self.timestamp_base_year.is_none() {
                        self.timestamp_base_year = Some(chrono::Utc::now().year());
                    }
                }
                "date" => self.attributes[att].kind = AttributeKind::Date,
                "time" => self.attributes[att].kind = AttributeKind::Time,
                "ignore" => self.attributes[att].kind = AttributeKind::Excluded,
                "label" => {
                    self.label_att = Some(att);
                    self.attributes[att].kind = AttributeKind::Label;
                }
                _ if first.starts_with("discrete") => {
                    self.attributes[att].kind = AttributeKind::Discrete;
                    let declared = leading_int(&first["discrete".len()..]);
                    if declared < 2 {
                        self.diags.report(
                            DiagnosticKind::BadDiscreteCount,
                            self.scanner.line(),
                            &self.attributes[att].name,
                            &first,
                        );
                    }
                    self.attributes[att].values =
                        Some(ValueList::with_max(declared.max(0) as usize));
                }
                _ => {
                    // A lone token cannot be a one-value discrete list.
                    self.diags.report(
                        DiagnosticKind::SingleAttributeValue,
                        self.scanner.line(),
                        &self.attributes[att].name,
                        &first,
                    );
                }
            }
            return Ok(());
        }

        // Discrete attribute with explicit values.
        self.attributes[att].kind = AttributeKind::Discrete;
        let mut list = ValueList::enumerated();

        let mut first_value = first;
        if let Some(rest) = first_value.strip_prefix("[ordered]") {
            self.attributes[att].ordered = true;
            first_value = rest.trim_start().to_owned();
        }
        list.push(first_value);

        loop {
            let Some(value) = self.scanner.read_name(MAX_NAME, true, &mut self.diags)? else {
                self.diags.report(
                    DiagnosticKind::EndOfInputInAttribute,
                    self.scanner.line(),
                    &self.attributes[att].name,
                    "",
                );
                return Err(self.fail());
            };
            list.push(value);
            if self.scanner.delimiter() != Delimiter::Comma {
                break;
            }
        }

        // Ordering is meaningless for three or fewer values.
        if self.attributes[att].ordered && list.real_count() <= 3 {
            self.attributes[att].ordered = false;
        }

        list.max_values = list.real_count();
        if list.values.len() > self.max_discrete_values {
            self.max_discrete_values = list.values.len();
        }
        self.attributes[att].values = Some(list);

        Ok(())
    }

    /// Derived attribute: hand the raw definition source to the expression
    /// compiler, then record which attributes the definition references.
    fn implicit_att(&mut self) -> anyhow::Result<()> {
        let att = self.attributes.len() - 1;
        let source = self.scanner.read_definition()?;

        match self.compiler.compile(&source, &self.attributes) {
            Ok(tree) => {
                self.attributes[att].depends_on = atts_used(&tree, self.attributes.len());
                self.attributes[att].definition = Some(tree);
            }
            Err(err) => {
                let detail = err.to_string();
                self.diags.report(
                    DiagnosticKind::BadDefinition,
                    self.scanner.line(),
                    &self.attributes[att].name,
                    &detail,
                );
            }
        }

        Ok(())
    }

    fn finish(&mut self, target_name: &str) -> anyhow::Result<AttributeTable> {
        let target = which(target_name, &self.attributes, 0, self.attributes.len());

        match target {
            Some(att) => {
                // The target can never be excluded from modeling.
                if self.attributes[att].skip {
                    self.attributes[att].skip = false;
                }
                if !self.attributes[att].is_continuous() {
                    self.diags.report(
                        DiagnosticKind::BadTarget,
                        self.scanner.line(),
                        target_name,
                        "",
                    );
                }
            }
            None => {
                self.diags.report(
                    DiagnosticKind::NoTarget,
                    self.scanner.line(),
                    target_name,
                    "",
                );
            }
        }

        // An excluded case weight attribute is simply dropped; a live one is
        // metadata, never a predictor.
        if let Some(att) = self.case_weight_att {
            if self.attributes[att].skip {
                self.case_weight_att = None;
            } else {
                self.attributes[att].skip = true;
            }
        }

        match target {
            Some(target) if self.diags.is_empty() => Ok(AttributeTable {
                attributes: std::mem::take(&mut self.attributes),
                target,
                label_att: self.label_att,
                case_weight_att: self.case_weight_att,
                max_discrete_values: self.max_discrete_values,
                timestamp_base_year: self.timestamp_base_year,
                stats: None,
            }),
            _ => Err(self.fail()),
        }
    }
}

/// Detects the bulk include/exclude directive (`attributes ... included`,
/// `attributes ... excluded`); returns whether it is the include form.
fn directive_mode(name: &str) -> Option<bool> {
    let bytes = name.as_bytes();
    if bytes.len() < 17 {
        return None;
    }
    if bytes[0] != b'a' && bytes[0] != b'A' {
        return None;
    }
    if bytes[1..11] != *b"ttributes " {
        return None;
    }
    if bytes[bytes.len() - 6..] != *b"cluded" {
        return None;
    }
    Some(bytes[bytes.len() - 8..bytes.len() - 6] == *b"in")
}

/// C-style leading integer: optional sign after whitespace, then digits; the
/// rest of the text is ignored. Zero when no digits are present.
fn leading_int(text: &str) -> i64 {
    let mut chars = text.trim_start().chars().peekable();
    let mut sign = 1i64;
    if let Some(&c) = chars.peek() {
        if c == '+' || c == '-' {
            chars.next();
            if c == '-' {
                sign = -1;
            }
        }
    }
    let mut value = 0i64;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(digit as i64);
        chars.next();
    }
    value.saturating_mul(sign)
}

/// Parse a names file given as a string.
pub fn parse_names(names: &str) -> anyhow::Result<AttributeTable> {
    log::debug!("Parsing {}", &names[..std::cmp::min(50, names.len())]);

    let parser = NamesParser::new(names.as_bytes());
    let table = parser.parse()?;
    log::debug!("Attribute table: {:?}", table);
    Ok(table)
}
