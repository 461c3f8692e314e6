use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::data::{Blob, FormData, Headers};
use crate::error::Error;
use crate::result::Result;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Decode a body as strict UTF-8.
pub fn decode_text(bytes: &Bytes) -> Result<String> {
    let text = std::str::from_utf8(bytes)?;
    Ok(text.to_owned())
}

/// Decode a JSON body into `D`, failing when the payload does not match `D`.
pub fn decode_json<D: DeserializeOwned>(bytes: &Bytes) -> Result<D> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode a JSON body without imposing any shape on it.
pub fn decode_json_value(bytes: &Bytes) -> Result<serde_json::Value> { decode_json(bytes) }

pub fn decode_blob(bytes: Bytes, headers: &Headers) -> Blob {
    Blob::new(bytes, headers.mime_type().unwrap_or_default())
}

/// Decode an `application/x-www-form-urlencoded` body.
pub fn decode_form_data(bytes: &Bytes, headers: &Headers) -> Result<FormData> {
    if headers.mime_type().as_deref() != Some(FORM_URLENCODED) {
        return Err(Error::new("Could not parse content as FormData."));
    }
    Ok(form_urlencoded::parse(bytes).into_owned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id:   u32,
        name: String,
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(&Bytes::from_static(b"hello")).unwrap(), "hello");
        assert!(decode_text(&Bytes::from_static(&[0xff, 0xfe])).is_err());
    }

    #[test]
    fn test_decode_json_typed() {
        let bytes = Bytes::from_static(br#"{"id":1,"name":"A"}"#);
        let item: Item = decode_json(&bytes).unwrap();
        assert_eq!(item, Item { id: 1, name: "A".into() });
    }

    #[test]
    fn test_decode_json_shape_mismatch_fails() {
        let bytes = Bytes::from_static(br#"{"id":"one"}"#);
        assert!(decode_json::<Item>(&bytes).is_err());
        assert!(decode_json_value(&bytes).is_ok());
    }

    #[test]
    fn test_decode_blob_mime() {
        let headers: Headers = [("Content-Type", "image/PNG")].into_iter().collect();
        let blob = decode_blob(Bytes::from_static(b"\x89PNG"), &headers);
        assert_eq!(blob.size(), 4);
        assert_eq!(blob.mime_type(), "image/png");
        assert_eq!(decode_blob(Bytes::new(), &Headers::new()).mime_type(), "");
    }

    #[test]
    fn test_decode_form_data() {
        let headers: Headers =
            [("content-type", "application/x-www-form-urlencoded; charset=utf-8")].into_iter().collect();
        let form = decode_form_data(&Bytes::from_static(b"a=1&b=hello+world&a=%2F"), &headers).unwrap();
        assert_eq!(form.get("b"), Some("hello world"));
        assert_eq!(form.get_all("a").collect::<Vec<_>>(), vec!["1", "/"]);
    }

    #[test]
    fn test_decode_form_data_rejects_other_types() {
        let headers: Headers = [("content-type", "application/json")].into_iter().collect();
        let error = decode_form_data(&Bytes::from_static(b"{}"), &headers).unwrap_err();
        assert_eq!(error.message(), "Could not parse content as FormData.");
    }
}
