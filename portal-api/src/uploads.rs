use crate::error::ValidationError;
use crate::transport::FilePart;

pub const CV_MAX_BYTES: usize = 10 * 1024 * 1024;
pub const CV_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn mime_for(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn check_extension(file: &FilePart, allowed: &[&str]) -> Result<(), ValidationError> {
    match extension(&file.file_name) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::UnsupportedFileType {
            file_name: file.file_name.clone(),
            allowed: allowed.join(", "),
        }),
    }
}

fn check_not_empty(file: &FilePart) -> Result<(), ValidationError> {
    if file.bytes.is_empty() {
        return Err(ValidationError::EmptyFile {
            file_name: file.file_name.clone(),
        });
    }
    Ok(())
}

/// PDF, DOC or DOCX up to 10 MB.
pub fn validate_cv(file: &FilePart) -> Result<(), ValidationError> {
    check_extension(file, CV_EXTENSIONS)?;
    check_not_empty(file)?;
    if file.size() > CV_MAX_BYTES {
        return Err(ValidationError::FileTooLarge {
            file_name: file.file_name.clone(),
            size: file.size(),
            limit: CV_MAX_BYTES,
        });
    }
    Ok(())
}

/// Report attachments and job banners.
pub fn validate_image(file: &FilePart) -> Result<(), ValidationError> {
    check_extension(file, IMAGE_EXTENSIONS)?;
    check_not_empty(file)?;
    if !file.mime.starts_with("image/") {
        return Err(ValidationError::UnsupportedFileType {
            file_name: file.file_name.clone(),
            allowed: IMAGE_EXTENSIONS.join(", "),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> FilePart {
        FilePart::new("file", name, mime_for(name), vec![0u8; size])
    }

    #[test]
    fn cv_accepts_documents_up_to_limit() {
        assert!(validate_cv(&file("resume.pdf", 1024)).is_ok());
        assert!(validate_cv(&file("Resume.DOCX", 1024)).is_ok());
        assert!(validate_cv(&file("resume.doc", CV_MAX_BYTES)).is_ok());
    }

    #[test]
    fn cv_rejects_oversized_file() {
        let err = validate_cv(&file("resume.pdf", CV_MAX_BYTES + 1)).unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { limit: CV_MAX_BYTES, .. }));
    }

    #[test]
    fn cv_rejects_other_types() {
        assert!(matches!(
            validate_cv(&file("resume.txt", 10)),
            Err(ValidationError::UnsupportedFileType { .. })
        ));
        assert!(matches!(
            validate_cv(&file("resume", 10)),
            Err(ValidationError::UnsupportedFileType { .. })
        ));
        assert!(matches!(
            validate_cv(&file("resume.pdf", 0)),
            Err(ValidationError::EmptyFile { .. })
        ));
    }

    #[test]
    fn images_only_for_attachments() {
        assert!(validate_image(&file("screen.png", 10)).is_ok());
        assert!(validate_image(&file("photo.JPEG", 10)).is_ok());
        assert!(validate_image(&file("report.pdf", 10)).is_err());

        let disguised = FilePart::new("file", "fake.png", "application/pdf", vec![1u8; 10]);
        assert!(validate_image(&disguised).is_err());
    }

    #[test]
    fn mime_guessing() {
        assert_eq!(mime_for("a.pdf"), "application/pdf");
        assert_eq!(mime_for("a.JPG"), "image/jpeg");
        assert_eq!(mime_for("a.bin"), "application/octet-stream");
    }
}
