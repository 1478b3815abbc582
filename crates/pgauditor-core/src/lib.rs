//! # pgauditor-core
//!
//! Synthesizes the PostgreSQL DDL that adds change auditing to a table:
//! an audit table, an operation enum, an id sequence, a settings lookup
//! helper, and one trigger function plus trigger per row operation.
//!
//! Nothing here executes SQL. The engine reads catalog metadata through a
//! [`SchemaInspector`] and returns a [`DdlScript`] for a human to review
//! and apply.
//!
//! # Architecture
//!
//! - **Naming** - every generated object name, derived from the table
//! - **Authentication** - how a trigger resolves `changed_by`
//! - **Capture** - the per-operation trigger function bodies
//! - **Synthesizer** - the ordered drop/create pass
//! - **Script** - the append-only statement list it produces
//!
//! # Example
//!
//! ```rust,ignore
//! use pgauditor_core::prelude::*;
//!
//! let table = TableIdentity::parse("public.account")?;
//! let synthesizer = DdlSynthesizer::new(
//!     table,
//!     AuthenticationMode::Database,
//!     SynthesisOptions::new().capture_application_name(true),
//! );
//! let script = synthesizer.synthesize(&inspector).await?;
//! println!("{script}");
//! ```

pub mod auth;
pub mod capture;
pub mod ddl;
pub mod error;
pub mod inspector;
pub mod model;
pub mod naming;
pub mod quote;
pub mod script;
pub mod synthesizer;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::auth::AuthenticationStrategy;
    pub use crate::capture::{Capture, ChangeCaptureBuilder};
    pub use crate::error::{AuditError, Result};
    pub use crate::inspector::SchemaInspector;
    pub use crate::model::{
        AuditOperation, AuthenticationMode, ColumnDescriptor, SynthesisOptions, TableIdentity,
    };
    pub use crate::naming::GeneratedNames;
    pub use crate::script::DdlScript;
    pub use crate::synthesizer::DdlSynthesizer;
}
