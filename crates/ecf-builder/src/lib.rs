//! Builders for the DGII e-CF JSON wire format.
//!
//! Three transformations share one foundation:
//!
//! - [`primary::build_ecf`] — full ECF document from a spreadsheet row,
//! - [`summary::build_acecf`] — commercial-approval acknowledgment (ACECF),
//! - [`rfce::ecf_to_rfce`] — consumer-invoice summary (RFCE) derived from an
//!   already-built ECF.
//!
//! The receiving validator performs strict schema checks: sibling key order
//! is significant, conditional fields must be present or absent exactly per
//! document type and monetary threshold, and extra fields are rejected.
//! Output documents are `serde_json::Value`s built with the
//! `preserve_order` feature so serialization reproduces emission order.
//!
//! All builders are pure, synchronous, and stateless; concurrent calls need
//! no coordination. The only resource-like concern is the thread-local RNG
//! behind the RFCE security token.

pub mod document;
pub mod numeric;
pub mod primary;
pub mod rfce;
pub mod summary;

mod items;

pub use document::ObjectBuilder;
pub use primary::build_ecf;
pub use rfce::{ecf_to_rfce, is_consumer_summary};
pub use summary::{build_acecf, build_acecf_batch};
