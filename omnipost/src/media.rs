use crate::error::ApiError;
use std::path::Path;

/// A file queued for `POST /media/upload`.
///
/// Holds the bytes in memory so the multipart body can be rebuilt if the request has to be
/// replayed after a credential refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        MediaFile {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ApiError::InvalidRequest(format!("not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path).map_err(|e| {
            ApiError::InvalidRequest(format!("couldn't read {}: {}", path.display(), e))
        })?;
        let mime_type = guess_mime_type(&file_name).to_string();
        Ok(MediaFile {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    pub(crate) fn to_form(&self) -> Result<reqwest::blocking::multipart::Form, ApiError> {
        let part = reqwest::blocking::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime_type)
            .map_err(|e| {
                ApiError::InvalidRequest(format!("bad MIME type {:?}: {}", self.mime_type, e))
            })?;
        Ok(reqwest::blocking::multipart::Form::new().part("file", part))
    }
}

/// Extension of a file name (without the dot), or empty string if there is none
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &file_name[idx + 1..],
    }
}

pub fn guess_mime_type(file_name: &str) -> &'static str {
    match file_extension(file_name).to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

#[test]
fn test_file_extension() {
    assert_eq!(file_extension("photo.JPG"), "JPG");
    assert_eq!(file_extension("archive.tar.gz"), "gz");
    assert_eq!(file_extension("README"), "");
    assert_eq!(file_extension(".bashrc"), "");
    assert_eq!(file_extension(""), "");
}

#[test]
fn test_media_kind() {
    let img = MediaFile::new("cat.png", guess_mime_type("cat.png"), vec![1, 2, 3]);
    assert!(img.is_image());
    assert!(!img.is_video());
    let vid = MediaFile::new("clip.MOV", guess_mime_type("clip.MOV"), vec![]);
    assert!(vid.is_video());
    assert_eq!(guess_mime_type("notes.txt"), "application/octet-stream");
}

#[test]
fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("banner.webp");
    std::fs::write(&path, b"RIFF").unwrap();
    let media = MediaFile::from_path(&path).unwrap();
    assert_eq!(media.file_name, "banner.webp");
    assert_eq!(media.mime_type, "image/webp");
    assert_eq!(media.bytes, b"RIFF".to_vec());

    assert!(MediaFile::from_path(dir.path().join("missing.png")).is_err());
}

#[test]
fn test_form_rejects_bad_mime_type() {
    let media = MediaFile::new("a.png", "image/png", vec![1]);
    assert!(media.to_form().is_ok());
    let media = MediaFile::new("a.png", "not a mime type", vec![1]);
    assert!(matches!(media.to_form(), Err(ApiError::InvalidRequest(_))));
}
