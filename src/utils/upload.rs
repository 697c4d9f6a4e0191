//! Multipart parsing for the employee creation form.

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use image::ImageFormat;
use tracing::debug;

use crate::error::ApiError;
use crate::model::employee::{FavTools, ProfileImage};
use crate::models::EmployeeSubmission;

/// Largest accepted profile photo (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Upper bound on all text parts of one form together.
const MAX_FORM_TEXT_BYTES: usize = 256 * 1024;

/// Upper bound on repeated `favTools` parts.
const MAX_TOOL_ENTRIES: usize = 100;

/// Reads a field into memory, failing as soon as it grows past `limit`.
async fn read_limited(field: &mut Field, limit: usize) -> Result<Option<Vec<u8>>, ApiError> {
    let mut buf = Vec::new();

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ApiError::Validation(format!("Multipart error: {e}")))?;
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Some(buf))
}

async fn drain(field: &mut Field) -> Result<(), ApiError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| ApiError::Validation(format!("Multipart error: {e}")))?;
    }
    Ok(())
}

async fn read_text(
    field: &mut Field,
    name: &str,
    text_budget: &mut usize,
) -> Result<String, ApiError> {
    let bytes = read_limited(field, MAX_TEXT_FIELD_BYTES.min(*text_budget))
        .await?
        .ok_or_else(|| ApiError::Validation(format!("{name} is too long")))?;
    *text_budget -= bytes.len();

    String::from_utf8(bytes).map_err(|_| ApiError::Validation(format!("{name} is not valid UTF-8")))
}

/// Checks an uploaded photo part.
///
/// Only an unnamed, empty part (an untouched file input) counts as "no photo".
/// Any other part needs an `image/*` type. When that type names a raster
/// format `image` can sniff, the bytes must be that format, so the stored
/// type always describes the stored bytes. Other image types (e.g. SVG) are
/// kept as declared.
pub fn check_image(
    filename: &str,
    declared_type: Option<&str>,
    data: Vec<u8>,
) -> Result<Option<ProfileImage>, ApiError> {
    if filename.is_empty() && data.is_empty() {
        return Ok(None);
    }

    let content_type = declared_type
        .filter(|t| t.starts_with("image/"))
        .ok_or_else(|| ApiError::PayloadRejected("Only image files are allowed".into()))?;

    if data.is_empty() {
        return Err(ApiError::PayloadRejected("Image file is empty".into()));
    }

    if data.len() > MAX_IMAGE_BYTES {
        return Err(image_too_large());
    }

    if let Some(expected) = ImageFormat::from_mime_type(content_type) {
        match image::guess_format(&data) {
            Ok(actual) if actual == expected => {}
            Ok(actual) => {
                return Err(ApiError::PayloadRejected(format!(
                    "Declared type {content_type} does not match {} content",
                    actual.to_mime_type()
                )));
            }
            Err(_) => {
                return Err(ApiError::PayloadRejected(format!(
                    "File content is not a valid {content_type} image"
                )));
            }
        }
    }

    Ok(Some(ProfileImage {
        content_type: content_type.to_owned(),
        data,
    }))
}

fn image_too_large() -> ApiError {
    ApiError::PayloadRejected(format!(
        "File too large. Maximum size is {} bytes ({}MB)",
        MAX_IMAGE_BYTES,
        MAX_IMAGE_BYTES / 1024 / 1024
    ))
}

/// Collects the create form. `favTools` may be sent once as CSV or repeated.
pub async fn read_employee_form(mut payload: Multipart) -> Result<EmployeeSubmission, ApiError> {
    let mut submission = EmployeeSubmission::default();
    let mut tools: Vec<String> = Vec::new();
    let mut saw_tools = false;
    let mut text_budget = MAX_FORM_TEXT_BYTES;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| ApiError::Validation(format!("Invalid multipart request: {e}")))?;
        let name = field.name().unwrap_or_default().to_owned();

        match name.as_str() {
            "name" | "designation" | "empId" | "password" => {
                let value = read_text(&mut field, &name, &mut text_budget).await?;
                let slot = match name.as_str() {
                    "name" => &mut submission.name,
                    "designation" => &mut submission.designation,
                    "empId" => &mut submission.emp_id,
                    _ => &mut submission.password,
                };
                *slot = Some(value);
            }
            "favTools" | "favTools[]" => {
                saw_tools = true;
                if tools.len() == MAX_TOOL_ENTRIES {
                    return Err(ApiError::Validation(format!(
                        "favTools accepts at most {MAX_TOOL_ENTRIES} entries"
                    )));
                }
                tools.push(read_text(&mut field, "favTools", &mut text_budget).await?);
            }
            "profileImage" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_owned);
                let Some(filename) = filename else {
                    // a plain text part (e.g. "null") means no photo was chosen
                    drain(&mut field).await?;
                    continue;
                };

                let declared = field.content_type().map(|m| m.essence_str().to_owned());
                let data = read_limited(&mut field, MAX_IMAGE_BYTES)
                    .await?
                    .ok_or_else(image_too_large)?;
                debug!(bytes = data.len(), content_type = ?declared, "Profile image received");
                submission.profile_image = check_image(&filename, declared.as_deref(), data)?;
            }
            _ => drain(&mut field).await?,
        }
    }

    if saw_tools {
        submission.fav_tools = Some(match tools.len() {
            1 => FavTools::Csv(tools.remove(0)),
            _ => FavTools::List(tools),
        });
    }

    Ok(submission)
}
