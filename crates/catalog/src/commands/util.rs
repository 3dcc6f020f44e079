//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use chrono::{DateTime, Utc};

use catalog_core::{OwnerId, StagedImage};

use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read an image file and stage it for upload. The content type comes
/// from the file extension.
pub fn stage_image(path: &Path) -> Result<StagedImage, CliError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::Validation {
            field: "image".into(),
            reason: format!("not a file path: {}", path.display()),
        })?;
    let content_type =
        StagedImage::content_type_for(file_name).ok_or_else(|| CliError::Validation {
            field: "image".into(),
            reason: format!("{file_name}: only JPEG and PNG images are accepted"),
        })?;
    let data = std::fs::read(path)?;
    Ok(StagedImage::new(file_name, content_type, data)?)
}

/// Owner column text: "you" for the signed-in user.
pub fn owner_label(owner: Option<OwnerId>, user: Option<OwnerId>, color: bool) -> String {
    match owner {
        Some(owner) if Some(owner) == user => output::owned("you", color),
        Some(owner) => owner.to_string(),
        None => output::dim("-", color),
    }
}

/// Creation time as shown in tables and detail views, always UTC.
pub fn created_label(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stages_png_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.PNG");
        std::fs::write(&path, b"\x89PNG\r\n").unwrap();

        let image = stage_image(&path).unwrap();
        assert_eq!(image.content_type(), "image/png");
        assert_eq!(image.file_name(), "board.PNG");
    }

    #[test]
    fn rejects_unsupported_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let err = stage_image(&path).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "image"));
    }

    #[test]
    fn created_label_is_minute_precision_utc() {
        use chrono::TimeZone;
        let at = Utc.with_ymd_and_hms(2018, 3, 4, 12, 30, 59).unwrap();
        assert_eq!(created_label(&at), "2018-03-04 12:30 UTC");
    }

    #[test]
    fn owner_label_marks_the_user() {
        assert_eq!(owner_label(Some(OwnerId(3)), Some(OwnerId(3)), false), "you");
        assert_eq!(owner_label(Some(OwnerId(4)), Some(OwnerId(3)), false), "4");
        assert_eq!(owner_label(None, None, false), "-");
    }
}
