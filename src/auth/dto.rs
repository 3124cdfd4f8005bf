use serde::{Deserialize, Serialize};

use crate::{
    auth::image::{ProfileImage, ProfileUpload},
    error::AuthError,
    records::UserRecord,
    ui::{Notice, Redirect},
};

/// Login form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Signup form fields. The picture is attached separately, once it passed
/// its own checks.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub education_level: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub agree_terms: bool,
    #[serde(skip)]
    pub profile_picture: Option<ProfileImage>,
}

impl SignupForm {
    /// Validates and attaches a picture; a rejected file clears the slot.
    pub fn attach_picture(&mut self, upload: ProfileUpload) -> Result<(), AuthError> {
        match upload.validate() {
            Ok(image) => {
                self.profile_picture = Some(image);
                Ok(())
            }
            Err(e) => {
                self.profile_picture = None;
                Err(e)
            }
        }
    }
}

/// Picture as sent by the browser adapter.
#[derive(Debug, Deserialize)]
pub struct PictureUpload {
    pub content_type: String,
    pub data_base64: String,
}

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(flatten)]
    pub form: SignupForm,
    #[serde(default)]
    pub profile_picture: Option<PictureUpload>,
}

#[derive(Debug, Deserialize)]
pub struct StrengthRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GateQuery {
    pub page: String,
}

/// Public part of the user returned to the page.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Option<String>,
    pub email: String,
    pub full_name: String,
    pub first_name: String,
    pub profile_pic: Option<String>,
}

impl From<&UserRecord> for PublicUser {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id.clone(),
            email: u.email.clone(),
            full_name: u.full_name.clone(),
            first_name: u.first_name().to_string(),
            profile_pic: u.profile_pic.clone(),
        }
    }
}

/// Response returned after login or signup.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub notice: Notice,
    pub redirect: Redirect,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct GateResponse {
    pub authenticated: bool,
    pub user: Option<PublicUser>,
    pub redirect: Option<Redirect>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub redirect: Redirect,
}
