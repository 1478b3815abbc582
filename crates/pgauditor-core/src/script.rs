//! The append-only DDL script handed back to the caller.

use std::fmt;

use serde::Serialize;

/// Ordered statements produced by one synthesis run.
///
/// Statements can only be appended. The rendered script is every
/// statement in append order, one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DdlScript {
    statements: Vec<String>,
}

impl DdlScript {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement. A missing terminating `;` is added.
    pub fn push(&mut self, statement: impl Into<String>) {
        let mut statement = statement.into();
        if !statement.trim_end().ends_with(';') {
            statement.push(';');
        }
        self.statements.push(statement);
    }

    /// Returns the statements in append order.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Returns the number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns whether nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl fmt::Display for DdlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order_and_terminates() {
        let mut script = DdlScript::new();
        assert!(script.is_empty());
        script.push("DROP TRIGGER IF EXISTS \"t\" ON \"public\".\"x\"");
        script.push("CREATE SEQUENCE \"public\".\"s\";");
        assert_eq!(script.len(), 2);
        assert_eq!(
            script.to_string(),
            "DROP TRIGGER IF EXISTS \"t\" ON \"public\".\"x\";\nCREATE SEQUENCE \"public\".\"s\";\n"
        );
    }

    #[test]
    fn test_empty_script_renders_empty() {
        assert_eq!(DdlScript::new().to_string(), "");
    }
}
