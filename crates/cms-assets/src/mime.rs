//! Mime type ⇄ filename extension lookup.

/// Conventional extension per mime type. First entry wins for reverse lookups.
const TABLE: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/jpeg", ".jpeg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/svg+xml", ".svg"),
    ("image/bmp", ".bmp"),
    ("image/tiff", ".tiff"),
    ("application/pdf", ".pdf"),
    ("application/json", ".json"),
    ("application/xml", ".xml"),
    ("application/zip", ".zip"),
    ("application/gzip", ".gz"),
    ("application/msword", ".doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    ("application/vnd.ms-excel", ".xls"),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".xlsx",
    ),
    ("text/plain", ".txt"),
    ("text/html", ".html"),
    ("text/css", ".css"),
    ("text/csv", ".csv"),
    ("text/markdown", ".md"),
    ("text/javascript", ".js"),
    ("audio/mpeg", ".mp3"),
    ("audio/wav", ".wav"),
    ("audio/ogg", ".ogg"),
    ("video/mp4", ".mp4"),
    ("video/webm", ".webm"),
    ("video/quicktime", ".mov"),
];

/// Extension (with leading dot) for a mime type.
///
/// Parameters such as `; charset=utf-8` are ignored. Unknown and wildcard
/// types yield an empty string.
pub fn extension_for_mime_type(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    TABLE
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .unwrap_or("")
}

/// Mime type for a filename extension, with or without the leading dot.
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    let wanted = format!(".{}", extension.trim_start_matches('.').to_ascii_lowercase());
    TABLE
        .iter()
        .find(|(_, ext)| *ext == wanted)
        .map(|(mime, _)| *mime)
}
