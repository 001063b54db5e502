#![forbid(unsafe_code)]
//! mailgate_lib: moteur de validation d'adresses e-mail
//!
//! Pipeline: parse -> disposable domain check -> syntax -> domain literal
//! policy -> MX deliverability. See [`Validator`].

pub mod address;
pub mod bulk;
pub mod config;
pub mod disposable;
pub mod mx;
pub mod options;
pub mod validator;

pub use address::{Address, FormatError};
pub use bulk::BulkError;
pub use config::{ConfigError, EngineConfig};
pub use disposable::{
    DisposableDomains, DisposableError, DomainListSource, FileListSource, HttpListSource,
    StaticListSource,
};
pub use mx::{
    Error as MxError, LookupMx, MxRecord, MxResolver, MxStatus, SystemLookup, check_mx,
};
pub use options::ValidationOptions;
pub use validator::{RejectionKind, ValidationError, ValidationVerdict, Validator};
