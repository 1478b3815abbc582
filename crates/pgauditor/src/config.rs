//! Command-line and environment configuration.
//!
//! Connection flags follow `psql`: `-h`, `-p`, `-U`, `-d` and `-W`, each
//! falling back to the matching `PG*` environment variable. Because `-h`
//! is the host, help is only available as `--help`.

use std::fmt;

use clap::{ArgAction, Parser};

use pgauditor_core::model::{
    AuthenticationMode, SynthesisOptions, TableIdentity, DEFAULT_CONFIG_PROPERTY,
};

use crate::catalog::ConnectionSettings;
use crate::output::OutputFormat;

/// Generate reviewable change-auditing DDL for a PostgreSQL table.
#[derive(Clone, Parser)]
#[command(name = "pgauditor")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Config {
    /// Table to audit, as `table` or `schema.table`.
    #[arg(short = 't', long)]
    pub table: TableIdentity,

    /// How triggers resolve the user behind a change.
    #[arg(short = 'a', long = "auth", default_value = "database")]
    pub auth: AuthenticationMode,

    /// Configuration parameter holding the application user.
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PROPERTY)]
    pub config_property: String,

    /// Only drop the audit triggers and trigger functions.
    #[arg(short = 'D', long = "drop")]
    pub drop_mode: bool,

    /// Record the session's application name on every audit row.
    #[arg(short = 'n', long)]
    pub application_name: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Sql)]
    pub format: OutputFormat,

    /// Database server host.
    #[arg(short = 'h', long, env = "PGHOST", default_value = "localhost")]
    pub host: String,

    /// Database server port.
    #[arg(short = 'p', long, env = "PGPORT", default_value_t = 5432)]
    pub port: u16,

    /// Role to connect as.
    #[arg(short = 'U', long, env = "PGUSER")]
    pub username: String,

    /// Database to connect to. Defaults to the role name.
    #[arg(short = 'd', long, env = "PGDATABASE")]
    pub dbname: Option<String>,

    /// Password for the role.
    #[arg(short = 'W', long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Enable verbose output.
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version.
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("table", &self.table)
            .field("auth", &self.auth)
            .field("config_property", &self.config_property)
            .field("drop_mode", &self.drop_mode)
            .field("application_name", &self.application_name)
            .field("format", &self.format)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("dbname", &self.dbname)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Config {
    /// Options for the synthesizer.
    #[must_use]
    pub fn synthesis_options(&self) -> SynthesisOptions {
        SynthesisOptions::new()
            .capture_application_name(self.application_name)
            .drop_mode(self.drop_mode)
            .config_property(self.config_property.clone())
    }

    /// Connection target for the catalog session.
    #[must_use]
    pub fn connection(&self) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            database: self
                .dbname
                .clone()
                .unwrap_or_else(|| self.username.clone()),
        }
    }
}
