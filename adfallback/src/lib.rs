//! AdFallback - related-content ads with network fallback
//!
//! This library orchestrates a related-content ad request on a page and falls
//! back to a secondary network (an exchange slot or a sense unit) when the
//! primary network fails to render.
//!
//! The orchestration is host-agnostic: the page and the vendor SDKs are
//! reached through the traits in [`host`], and time is modeled by the
//! virtual clock in [`event_loop`]. [`session::Session`] ties everything
//! together.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use adfallback::host::sim::SimulatedHost;
//! use adfallback::session::Session;
//!
//! let mut session = Session::new(SimulatedHost::new());
//! session.start_json(r#"{"p":"pub","s":"42","c":"news","fb":"1","pc":"ca-pub-1","sl":"9876"}"#)?;
//!
//! session.advance(Duration::from_secs(3));
//! assert_eq!(session.host().sense.pushes(), 1);
//! # Ok::<(), adfallback::session::SessionError>(())
//! ```

pub mod config;
pub mod event_loop;
pub mod fallback;
pub mod host;
pub mod pixel;
pub mod probe;
pub mod registry;
pub mod retry;
pub mod session;
pub mod viewport;

pub use config::{AdType, ConfigError, LoaderConfig, LoaderTimings, RawConfig};
pub use fallback::{FallbackAction, FallbackDecision};
pub use host::Host;
pub use registry::{AdSlotRegistry, SlotSummary};
pub use session::{Session, SessionError};
pub use viewport::{sizes_for_width, AdSize, ViewportBucket};
