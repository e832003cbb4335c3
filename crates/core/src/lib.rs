pub mod auth;
pub mod config;
pub mod entry;
pub mod flow;
pub mod registration;
pub mod store;
pub mod testing;
pub mod ticket;

pub use auth::{
    create_session_provider, AuthError, Session, SessionProvider, StaticTokenProvider,
    TokenFileProvider,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    SessionConfig, SessionMethod, StoreConfig,
};
pub use entry::{resolve_entry, EntryRoute};
pub use flow::{Disposition, FailureKind, FlowError, FlowResult};
pub use registration::{
    DraftError, DraftField, FieldError, GuardianSlot, IgnoreReason, Phase, Reconciler,
    ReconcilerView, RegistrationDraft, StudentIdentity, SubmitOutcome,
};
pub use store::{
    HttpStudentStore, RegistrationRequest, StoreError, StudentProfile, StudentStore, TicketPayload,
};
pub use ticket::{
    render_document, DocumentError, GeneratedDocument, TicketConfig, TicketRecord, TicketRenderer,
};
