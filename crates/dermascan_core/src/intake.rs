//! crates/dermascan_core/src/intake.rs
//!
//! The intake form as the user fills it in, and its validation into an
//! `AnalysisSubmission`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::domain::{AnalysisSubmission, ImageUpload, UserDetails};
use crate::error::ValidationError;

/// Image extensions the analysis endpoint accepts, with their MIME types.
const IMAGE_TYPES: [(&str, &str); 3] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

/// Raw form fields. Everything except the image is optional.
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub skin_type: String,
    /// Comma-separated, e.g. `"nuts, dairy"`.
    pub allergies: String,
    pub image: Option<ImageUpload>,
}

impl IntakeForm {
    pub fn validate(self) -> Result<AnalysisSubmission, ValidationError> {
        let image = self.image.ok_or(ValidationError::MissingImage)?;
        image_content_type(&image.file_name)?;

        let age = match self.age.trim() {
            "" => None,
            raw => Some(
                raw.parse::<u32>()
                    .map_err(|_| ValidationError::InvalidAge(raw.to_string()))?,
            ),
        };

        Ok(AnalysisSubmission {
            image,
            details: UserDetails {
                name: self.name.trim().to_string(),
                age,
                gender: self.gender.trim().to_string(),
                skin_type: self.skin_type.trim().to_string(),
                allergies: parse_allergies(&self.allergies),
            },
        })
    }
}

/// Splits on commas and trims each entry; empty entries are dropped.
pub fn parse_allergies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// The wire form of the allergy list.
pub fn join_allergies(allergies: &[String]) -> String {
    allergies.join(",")
}

/// Maps a file name to the MIME type of an accepted image.
pub fn image_content_type(file_name: &str) -> Result<&'static str, ValidationError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| ValidationError::UnsupportedImageType(file_name.to_string()))
}

impl ImageUpload {
    /// Builds an upload, inferring the MIME type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        let content_type = image_content_type(&file_name)?.to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        })
    }

    /// Inline representation stored as a result's `imageUrl`.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}
