/// Known MIME types mapped to a filename extension, used by the
/// storage-delegated URL strategy to generate a deterministic filename when
/// the caller didn't supply one. Unknown types yield no extension.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    Some(match mime_type {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        "application/pdf" => ".pdf",
        "text/plain" => ".txt",
        "text/html" => ".html",
        "text/csv" => ".csv",
        "application/json" => ".json",
        "application/zip" => ".zip",
        "video/mp4" => ".mp4",
        "audio/mpeg" => ".mp3",
        "application/msword" => ".doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => ".docx",
        "application/vnd.ms-excel" => ".xls",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => ".xlsx",
        "application/vnd.ms-powerpoint" => ".ppt",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => ".pptx",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_resolve() {
        assert_eq!(extension_for("image/jpeg"), Some(".jpg"));
        assert_eq!(extension_for("application/pdf"), Some(".pdf"));
    }

    #[test]
    fn unknown_type_has_no_extension() {
        assert_eq!(extension_for("application/x-made-up"), None);
    }
}
