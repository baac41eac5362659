/// Локальный файл, выбранный пользователем, но ещё не загруженный в хранилище
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Расширение исходного имени файла (без точки), если оно есть
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name.rsplit(['/', '\\']).next().unwrap_or_default();
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// MIME-тип для загрузки: переданный клиентом или по расширению
    pub fn mime_type(&self) -> &str {
        if let Some(ct) = self.content_type.as_deref() {
            return ct;
        }
        match self.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("svg") => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(UploadFile::new("photo.png", vec![]).extension(), Some("png"));
        assert_eq!(UploadFile::new("a.b.JPG", vec![]).extension(), Some("JPG"));
        assert_eq!(UploadFile::new("README", vec![]).extension(), None);
        assert_eq!(UploadFile::new(".hidden", vec![]).extension(), None);
        assert_eq!(UploadFile::new("dir.v2/file", vec![]).extension(), None);
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(UploadFile::new("a.JPG", vec![]).mime_type(), "image/jpeg");
        let file = UploadFile::new("a.bin", vec![]).with_content_type("image/avif");
        assert_eq!(file.mime_type(), "image/avif");
    }
}
