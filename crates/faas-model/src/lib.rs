//! Data model for the FaaS client.
//!
//! - **record**: canonical records and the positional dataset bundle
//! - **spec**: typed model configuration
//! - **wire**: vector-shaped wire representations
//! - **response**: service variants and call results
//! - **error**: the error taxonomy shared by every crate

pub mod error;
pub mod record;
pub mod response;
pub mod spec;
pub mod wire;

pub use error::{FaasError, Result, SchemaError, ValidationError};
pub use record::{CanonicalRecord, DatasetBundle};
pub use response::{
    CallResult, SUCCESS_STATUSES, Service, is_success_status, parse_body, warning_list,
};
pub use spec::{ModelSpec, REQUIRED_SELECTION_KEYS, REQUIRED_SPEC_KEYS, SelectionMethods};
pub use wire::{APPLY_COLLINEAR, Singleton, WireModelSpec, WireSelectionMethods};
