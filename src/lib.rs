//! Allcast orbit parameter and constellation status (AOPCS) decoding.
//!
//! Decodes the bit-packed Allcast broadcast into [frame::Frame]s and projects them
//! into the flat AOP report used for satellite pass prediction.
//!
//! # Example
//! ```no_run
//! use aopcs::report::{Projector, Whitelist};
//!
//! let dat = std::fs::read("allcast.bin").unwrap();
//! let frames = aopcs::decode(&dat).unwrap();
//! let report = Projector::builder()
//!     .whitelist(Whitelist::parse("1A,1B,5E"))
//!     .build()
//!     .project(&frames);
//! println!("{}", report.render());
//! println!("{}", serde_json::to_string(&report.metadata()).unwrap());
//! ```
mod error;

pub mod bits;
pub mod codec;
pub mod frame;
pub mod metadata;
pub mod report;
pub mod stream;
pub mod tables;

pub use error::{Error, Result};
pub use report::project;
pub use stream::decode;
