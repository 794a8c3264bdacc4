#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core joint mobility test logic (device-agnostic).
//!
//! Device bytes come in through `mobility_traits::ByteSource` and decoded
//! samples go out through `mobility_traits::PlotFeed`; everything between is
//! plain computation.
//!
//! ## Architecture
//!
//! - **Lines**: raw byte stream → text lines (`lines`, `reader`)
//! - **Decoder**: text line → `Sample`, rounded to 0.1 (`decoder`)
//! - **Session**: baseline capture and max-deviation accumulation (`session`)
//! - **Scoring**: deviation vector → score (`scoring`)
//! - **Store**: persisted, append-only result history (`store`)
//! - **Engine**: wires the above for a single consumer thread (`engine`)

pub mod atomic;
pub mod config;
pub mod conversions;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod joint;
pub mod lines;
pub mod mocks;
pub mod plot;
pub mod reader;
pub mod scoring;
pub mod session;
pub mod status;
pub mod store;
pub mod types;
pub mod util;

pub use config::{PlotCfg, SessionCfg, StoreCfg};
pub use decoder::{MAX_READING, Sample, SampleDecoder, decode};
pub use engine::{EngineBuilder, MobilityEngine};
pub use error::{BuildError, DecodeError, EngineError, SessionError, StoreError};
pub use joint::TestIdentifier;
pub use plot::{NullFeed, PlotBuffer, RefreshGate};
pub use reader::{LineReader, ReaderEvent};
pub use scoring::score;
pub use session::TestSession;
pub use status::{LineOutcome, SessionPhase, SessionStatus};
pub use store::ResultStore;
pub use types::TestResult;
