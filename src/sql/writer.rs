//! Helper to generate SQL text
//!
//! The writer owns the result buffer and the renaming of IUs to generated
//! column names. Names are handed out as `v_1, v_2, …` in first-reference
//! order, which keeps emission deterministic and collision-free.

use crate::algebra::IuId;
use crate::types::{Type, TypeKind};
use std::collections::HashMap;

/// Helper class to generate SQL
#[derive(Default)]
pub struct SqlWriter {
    /// The result buffer
    result: String,
    /// All assigned IU names
    iu_names: HashMap<IuId, String>,
}

impl SqlWriter {
    pub fn new() -> Self {
        SqlWriter::default()
    }

    /// Write a SQL fragment
    pub fn write(&mut self, sql: &str) {
        self.result.push_str(sql);
    }

    /// Write an identifier, always quoting
    pub fn write_identifier(&mut self, identifier: &str) {
        self.result.push('"');
        for c in identifier.chars() {
            if c == '"' {
                self.result.push_str("\"\"");
            } else {
                self.result.push(c);
            }
        }
        self.result.push('"');
    }

    /// Write a result column name, quoting only when needed
    pub fn write_name(&mut self, name: &str) {
        let plain = !name.is_empty()
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if plain {
            self.result.push_str(name);
        } else {
            self.write_identifier(name);
        }
    }

    /// Write an IU, assigning a generated name on first reference
    pub fn write_iu(&mut self, iu: IuId) {
        if let Some(name) = self.iu_names.get(&iu) {
            self.result.push_str(name);
        } else {
            let name = format!("v_{}", self.iu_names.len() + 1);
            self.result.push_str(&name);
            self.iu_names.insert(iu, name);
        }
    }

    /// Write a string literal, quoting as needed
    pub fn write_string(&mut self, text: &str) {
        self.result.push('\'');
        for c in text.chars() {
            if c == '\'' {
                self.result.push_str("''");
            } else {
                self.result.push(c);
            }
        }
        self.result.push('\'');
    }

    /// Write a type in SQL syntax
    pub fn write_type(&mut self, ty: Type) {
        match ty.kind() {
            // Only reachable for bare NULL values
            TypeKind::Unknown => self.write("unknown"),
            TypeKind::Bool => self.write("boolean"),
            TypeKind::Integer => self.write("integer"),
            TypeKind::Decimal { precision, scale } => {
                self.write(&format!("decimal({},{})", precision, scale));
            }
            TypeKind::Char { length } => self.write(&format!("char({})", length)),
            TypeKind::Varchar { length } => self.write(&format!("varchar({})", length)),
            TypeKind::Text => self.write("text"),
            TypeKind::Date => self.write("date"),
            TypeKind::Interval => self.write("interval"),
        }
    }

    /// Get the result
    pub fn into_result(self) -> String {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iu_names_are_assigned_in_first_reference_order() {
        let mut out = SqlWriter::new();
        let (a, b) = (IuId::for_tests(10), IuId::for_tests(20));
        out.write_iu(b);
        out.write(", ");
        out.write_iu(a);
        out.write(", ");
        out.write_iu(b);
        assert_eq!(out.into_result(), "v_1, v_2, v_1");
    }

    #[test]
    fn identifiers_and_strings_are_escaped() {
        let mut out = SqlWriter::new();
        out.write_identifier("a\"b");
        out.write(" ");
        out.write_string("it's");
        assert_eq!(out.into_result(), "\"a\"\"b\" 'it''s'");
    }

    #[test]
    fn names_quote_only_when_needed() {
        let mut out = SqlWriter::new();
        out.write_name("n_name");
        out.write(" ");
        out.write_name(" sym 1");
        out.write(" ");
        out.write_name("2");
        assert_eq!(out.into_result(), "n_name \" sym 1\" \"2\"");
    }

    #[test]
    fn type_syntax() {
        let mut out = SqlWriter::new();
        out.write_type(Type::decimal(12, 2));
        out.write(" ");
        out.write_type(Type::char(25));
        out.write(" ");
        out.write_type(Type::varchar(55).as_nullable());
        out.write(" ");
        out.write_type(Type::unknown());
        assert_eq!(out.into_result(), "decimal(12,2) char(25) varchar(55) unknown");
    }
}
