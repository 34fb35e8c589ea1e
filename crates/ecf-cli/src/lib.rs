//! Library surface of the e-CF batch driver.
//!
//! Only the logging setup is exposed; everything else lives in the binary.

pub mod logging;
