//! MIME type detection module
//!
//! Content-Type lookup for the media and thumbnail files this server delivers.

/// Served when a media file has an extension we do not recognise
pub const DEFAULT_MEDIA_TYPE: &str = "video/mp4";

/// Get MIME Content-Type based on file extension (case-insensitive)
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return DEFAULT_MEDIA_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        // Video
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "ogv" => "video/ogg",
        "ts" | "m2ts" => "video/mp2t",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",

        // Thumbnails
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",

        _ => DEFAULT_MEDIA_TYPE,
    }
}
