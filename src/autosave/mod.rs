pub mod form;
pub mod saver;

pub use form::{FieldChange, FieldKind, FormField, TrackedForm};
pub use saver::{AutoSaveRecord, AutoSaver, DEFAULT_DEBOUNCE, DEFAULT_TTL, RestoreOutcome};
