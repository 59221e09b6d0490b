use axum::body::Bytes;

/// OCR tuning profile understood by the upstream service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Printed documents (upstream default)
    #[default]
    Printed,
    Handwriting,
    Legal,
    Scanned,
    English,
    Multilang,
}

impl Profile {
    pub const ALL: [Profile; 6] = [
        Self::Printed,
        Self::Handwriting,
        Self::Legal,
        Self::Scanned,
        Self::English,
        Self::Multilang,
    ];

    /// Parse from a form field string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "printed" => Some(Self::Printed),
            "handwriting" => Some(Self::Handwriting),
            "legal" => Some(Self::Legal),
            "scanned" => Some(Self::Scanned),
            "english" => Some(Self::English),
            "multilang" => Some(Self::Multilang),
            _ => None,
        }
    }

    /// Wire value sent to the OCR service
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Printed => "printed",
            Self::Handwriting => "handwriting",
            Self::Legal => "legal",
            Self::Scanned => "scanned",
            Self::English => "english",
            Self::Multilang => "multilang",
        }
    }

    /// Human-readable label shown in the form
    pub fn label(&self) -> &'static str {
        match self {
            Self::Printed => "Printed",
            Self::Handwriting => "Handwriting",
            Self::Legal => "Legal",
            Self::Scanned => "Scanned",
            Self::English => "English",
            Self::Multilang => "Multilingual",
        }
    }
}

/// Output format requested from the OCR service; drives response rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Text, Self::Json, Self::Html];

    /// Parse from a form field string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Wire value sent as `output_format`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Html => "html",
        }
    }

    /// Human-readable label shown in the form
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Json => "JSON",
            Self::Html => "HTML",
        }
    }
}

/// Optional image pre-processing requested from the OCR service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enhancement {
    Contrast,
    Sharpness,
    Brightness,
    /// Unsharp-mask deblurring; the upstream keeps its historical wire name
    Defloutage,
}

impl Enhancement {
    pub const ALL: [Enhancement; 4] = [
        Self::Contrast,
        Self::Sharpness,
        Self::Brightness,
        Self::Defloutage,
    ];

    /// Parse from a form field string; empty means "no enhancement"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "contrast" => Some(Self::Contrast),
            "sharpness" => Some(Self::Sharpness),
            "brightness" => Some(Self::Brightness),
            "defloutage" => Some(Self::Defloutage),
            _ => None,
        }
    }

    /// Wire value sent as `enhance`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contrast => "contrast",
            Self::Sharpness => "sharpness",
            Self::Brightness => "brightness",
            Self::Defloutage => "defloutage",
        }
    }

    /// Human-readable label shown in the form
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contrast => "Contrast",
            Self::Sharpness => "Sharpness",
            Self::Brightness => "Brightness",
            Self::Defloutage => "Deblur",
        }
    }
}

/// One upload parsed from the browser form; lives for a single request
#[derive(Debug, Clone)]
pub struct Submission {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
    pub profile: Profile,
    pub format: OutputFormat,
    pub enhance: Option<Enhancement>,
}
