//! Pure body decoding.
//!
//! Nothing here performs I/O: the effects layer reads the bytes, these
//! functions interpret them.

mod decode;

pub use decode::{decode_blob, decode_form_data, decode_json, decode_json_value, decode_text};
