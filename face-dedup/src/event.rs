use common_rekognition::ImageReference;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::{DedupError, KeyDecodeError};

/// Payload the function is invoked with, pointing at a freshly uploaded image.
/// Missing fields deserialize as empty so they surface as a `DecodeError`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageEvent {
    #[serde(default)]
    pub s3_bucket: String,
    #[serde(default)]
    pub s3_key: String,
}

impl ImageEvent {
    pub fn new(s3_bucket: &str, s3_key: &str) -> Self {
        Self {
            s3_bucket: s3_bucket.to_owned(),
            s3_key: s3_key.to_owned(),
        }
    }

    /// Resolve the event into the S3 object it refers to, decoding the key.
    pub fn image_reference(&self) -> Result<ImageReference, DedupError> {
        let decode_error = |source| DedupError::Decode {
            raw_key: self.s3_key.clone(),
            source,
        };

        if self.s3_bucket.is_empty() {
            return Err(decode_error(KeyDecodeError::MissingBucket));
        }
        if self.s3_key.is_empty() {
            return Err(decode_error(KeyDecodeError::MissingKey));
        }

        let key = decode_object_key(&self.s3_key).map_err(decode_error)?;

        Ok(ImageReference::new(&self.s3_bucket, &key))
    }
}

/// Decode an S3 object key as delivered in S3 event notifications: spaces arrive as `+`,
/// everything else outside the unreserved set is percent-encoded.
///
/// Unlike `percent_decode_str` on its own, a `%` that does not start a valid escape is an
/// error rather than being passed through.
pub fn decode_object_key(raw_key: &str) -> Result<String, KeyDecodeError> {
    let unplussed = raw_key.replace('+', " ");
    check_escapes(&unplussed)?;

    percent_decode_str(&unplussed)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| KeyDecodeError::InvalidUtf8(e.to_string()))
}

fn check_escapes(s: &str) -> Result<(), KeyDecodeError> {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }

        match bytes.get(i + 1..i + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
            _ => {
                // `%` is ASCII, so `i` is on a char boundary
                let escape: String = s[i..].chars().take(3).collect();
                return Err(KeyDecodeError::InvalidEscape(escape));
            }
        }
    }

    Ok(())
}
