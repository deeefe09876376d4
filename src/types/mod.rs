//! Oracle data type encoding and decoding
//!
//! This module provides functions for encoding host values to Oracle's wire format
//! and decoding Oracle wire format to host values.

mod binary;
mod date;
mod lob;
mod number;

pub use binary::{
    decode_binary_double, decode_binary_float, encode_binary_double, encode_binary_float,
};
pub use date::{
    decode_oracle_date, decode_oracle_timestamp, decode_oracle_timestamp_tz, encode_oracle_date,
    encode_oracle_timestamp, encode_oracle_timestamp_tz,
};
pub use lob::{LobData, LobLocator, LobValue};
pub use number::{decode_oracle_number, encode_oracle_number};
