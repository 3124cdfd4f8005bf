use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use tracing::warn;

use crate::error::AuthError;

pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A picked file, not yet checked.
#[derive(Debug, Clone)]
pub struct ProfileUpload {
    pub content_type: String,
    pub body: Bytes,
}

/// A profile picture that passed the type and size checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    content_type: &'static str,
    body: Bytes,
}

fn accepted_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" => Some("image/jpeg"),
        "image/jpg" => Some("image/jpg"),
        "image/png" => Some("image/png"),
        _ => None,
    }
}

impl ProfileUpload {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn validate(self) -> Result<ProfileImage, AuthError> {
        let Some(content_type) = accepted_mime(&self.content_type) else {
            warn!(content_type = %self.content_type, "profile picture type rejected");
            return Err(AuthError::InvalidImage);
        };
        if self.body.len() > MAX_PROFILE_IMAGE_BYTES {
            warn!(size = self.body.len(), "profile picture too large");
            return Err(AuthError::InvalidImage);
        }
        Ok(ProfileImage {
            content_type,
            body: self.body,
        })
    }
}

impl ProfileImage {
    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.body))
    }
}
