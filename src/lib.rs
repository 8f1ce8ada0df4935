//! Transaction lifecycle and event-identifier recovery engine for the
//! CropCircle event registry and its CROP token ledger.
//!
//! The create/claim path runs Submitter -> Watcher -> Decoder -> Retry
//! Coordinator; the funding path reuses Submitter and Watcher twice,
//! sequentially. The chain itself sits behind the trait seams in
//! [`ledger`].

// Engine components
pub mod balance; // pre-flight sufficiency checks in base units
pub mod config; // TOML config with serde field defaults, env bootstrap
pub mod decoder; // ordered log-decoding strategies
pub mod errors; // error taxonomy + user-facing message mapping
pub mod funding; // allowance-then-deposit workflow
pub mod ledger; // external ledger trait seams (+ scriptable mock)
pub mod pipeline; // create/claim orchestration
pub mod registry; // read-only registry projections
pub mod retry; // bounded decode retry coordinator
pub mod session; // sled-backed session identifiers
pub mod submitter; // one call, one outcome
pub mod types; // handles, receipts, identifiers, records
pub mod watcher; // bounded receipt polling

// Re-export commonly used types
pub use config::Config;
pub use decoder::{EventLogDecoder, ExtractedId, IdSource};
pub use errors::{EngineError, FundingStep};
pub use funding::{FundingOutcome, FundingRequest, FundingState, FundingWorkflow};
pub use pipeline::{ClaimOutcome, ClaimWorkflow, CreateEventPipeline, CreatedEvent};
pub use session::SessionStore;
pub use types::{ActionRegistry, EventId, EventRecord, RawAmount, Receipt, TxHandle, TxStatus};
