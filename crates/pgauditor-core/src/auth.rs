//! Resolution of `changed_by` inside generated trigger functions.

use crate::model::AuthenticationMode;
use crate::quote::quote_literal;

/// PL/pgSQL variable every trigger function stores the acting user in.
pub const CHANGED_BY_VARIABLE: &str = "audit_changed_by";

/// Builds the statements that fill [`CHANGED_BY_VARIABLE`].
///
/// The fragment is the same for all three operations. Under
/// [`AuthenticationMode::Application`] it aborts the triggering statement
/// when the configuration parameter is unset or blank, so unattributed
/// changes are rolled back instead of being recorded.
#[derive(Debug, Clone)]
pub struct AuthenticationStrategy {
    mode: AuthenticationMode,
    config_property: String,
    settings_function: String,
}

impl AuthenticationStrategy {
    /// Creates a strategy.
    ///
    /// `settings_function` must already be quoted and schema-qualified.
    pub fn new(
        mode: AuthenticationMode,
        config_property: impl Into<String>,
        settings_function: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            config_property: config_property.into(),
            settings_function: settings_function.into(),
        }
    }

    /// Returns the authentication mode.
    #[must_use]
    pub fn mode(&self) -> AuthenticationMode {
        self.mode
    }

    /// Returns the PL/pgSQL statements, indented for a function body.
    /// Empty under [`AuthenticationMode::Anonymous`].
    #[must_use]
    pub fn fragment(&self) -> String {
        match self.mode {
            AuthenticationMode::Database => {
                format!("    {CHANGED_BY_VARIABLE} := session_user;\n")
            }
            AuthenticationMode::Anonymous => String::new(),
            AuthenticationMode::Application => {
                let property = quote_literal(&self.config_property);
                format!(
                    "    {var} := {func}({property});\n\
                     \x20   IF {var} IS NULL OR {var} !~ '\\S' THEN\n\
                     \x20       RAISE EXCEPTION 'Configuration parameter % must identify the current user', {property};\n\
                     \x20   END IF;\n",
                    var = CHANGED_BY_VARIABLE,
                    func = self.settings_function,
                )
            }
        }
    }
}
