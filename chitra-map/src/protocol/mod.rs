//! Line-oriented update protocol.
//!
//! # Record Format
//!
//! ```text
//! poseX poseY poseTh deviceId range\n        (5 integers, device space)
//! x y pr;x y pr;...                          (optional fill list)
//! ```
//!
//! Fill coordinates are device space on the wire and array space once
//! decoded. Probabilities are written by the mapper as `%.4f`; a trailing
//! `;` is accepted.
//!
//! # Error Policy
//!
//! | Input | Result |
//! |-------|--------|
//! | empty | `Ok(None)` (no update) |
//! | wrong line or field count | `MalformedRecord` |
//! | unparsable number | `MalformedRecord` (whole record rejected) |
//! | pose outside grid | reading with empty fill |
//! | fill outside grid | token skipped |

mod decoder;
mod encoder;

pub use decoder::decode;
pub use encoder::encode_record;
