//! Server-rendered pages: the upload form and the post-submission result.
//!
//! Every branch that reflects upstream text either HTML-escapes it or pushes
//! it through the allow-list filter in `sanitize`; nothing else is rendered
//! unescaped.

use serde::Serialize;

use crate::relay::UpstreamOutcome;
use crate::sanitize;
use crate::submission::{Enhancement, OutputFormat, Profile};

/// Stylesheet carried on every rendered page
const STYLE: &str = r#"        body { font-family: Arial, sans-serif; margin: 20px; }
        .error {
            color: red;
            font-weight: bold;
            padding: 10px;
            background-color: #ffe6e6;
            border: 1px solid #ff9999;
            border-radius: 4px;
            margin: 10px 0;
        }
        h1 { color: #333; }
        form { background: #f9f9f9; padding: 20px; border-radius: 8px; }
        label { display: block; margin-top: 10px; font-weight: bold; }
        input, select, button { margin-top: 5px; padding: 8px; }
        button { background: #007cba; color: white; border: none; border-radius: 4px; cursor: pointer; }
        button:hover { background: #005a87; }
        pre { background: #f0f0f0; padding: 15px; border-radius: 4px; overflow-x: auto; }"#;

/// Render the landing page: the bare upload form
pub fn form_page() -> String {
    page(None)
}

/// Render the page shown after a submission, result section above the form
pub fn results_page(format: OutputFormat, outcome: &UpstreamOutcome) -> String {
    page(Some(format!(
        "    <h2>OCR Result</h2>\n{}",
        render_outcome(format, outcome)
    )))
}

/// Render a page for a rejected submission
pub fn error_page(message: &str) -> String {
    page(Some(error_banner(message)))
}

/// Render the upstream outcome for the requested output format.
/// Branches are mutually exclusive and evaluated in order: transport
/// failure, non-200 status, then the format-specific 200 paths.
fn render_outcome(format: OutputFormat, outcome: &UpstreamOutcome) -> String {
    let (status, body) = match outcome {
        UpstreamOutcome::Unreachable { .. } => {
            return error_banner("Could not connect to the OCR API");
        }
        UpstreamOutcome::Replied { status, body } => (*status, body.as_str()),
    };

    if status != 200 {
        return format!(
            "{}\n{}",
            error_banner(&format!("OCR API error (Code: {})", status)),
            pre_escaped(body)
        );
    }

    match format {
        OutputFormat::Json => render_json(body),
        OutputFormat::Html => render_html(body),
        OutputFormat::Text => pre_escaped(body),
    }
}

fn render_json(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => pre_escaped(&pretty_json(&value)),
        Err(_) => format!(
            "{}\n{}",
            error_banner("Invalid JSON response"),
            pre_escaped(body)
        ),
    }
}

fn render_html(body: &str) -> String {
    // Cheap shape check before handing the document to the rewriter
    if body.contains("<html>") && body.contains("</html>") {
        if let Ok(clean) = sanitize::apply(body) {
            return clean;
        }
    }
    format!(
        "{}\n{}",
        error_banner("Invalid HTML response"),
        pre_escaped(body)
    )
}

/// Serialize with 4-space indentation; Unicode stays as UTF-8
fn pretty_json(value: &serde_json::Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}

fn error_banner(message: &str) -> String {
    format!(
        "    <div class=\"error\">{}</div>",
        html_escape::encode_text(message)
    )
}

fn pre_escaped(text: &str) -> String {
    format!("    <pre>{}</pre>", html_escape::encode_text(text))
}

fn profile_options() -> String {
    Profile::ALL
        .iter()
        .map(|p| format!("            <option value=\"{}\">{}</option>\n", p.as_str(), p.label()))
        .collect()
}

fn format_options() -> String {
    OutputFormat::ALL
        .iter()
        .map(|f| format!("            <option value=\"{}\">{}</option>\n", f.as_str(), f.label()))
        .collect()
}

fn enhancement_options() -> String {
    Enhancement::ALL
        .iter()
        .map(|e| format!("            <option value=\"{}\">{}</option>\n", e.as_str(), e.label()))
        .collect()
}

fn upload_form() -> String {
    format!(
        r#"    <form method="post" enctype="multipart/form-data" action="/">
        <label for="document">Document</label>
        <input type="file" id="document" name="document" required>

        <label for="profile">Profile</label>
        <select id="profile" name="profile">
{profiles}        </select>

        <label for="format">Output format</label>
        <select id="format" name="format">
{formats}        </select>

        <label for="enhance">Image enhancement</label>
        <select id="enhance" name="enhance">
            <option value="">None</option>
{enhancements}        </select>

        <button type="submit">Send</button>
    </form>"#,
        profiles = profile_options(),
        formats = format_options(),
        enhancements = enhancement_options(),
    )
}

fn page(result: Option<String>) -> String {
    let result = match result {
        Some(fragment) => format!("{}\n", fragment),
        None => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>OCR API Test Harness</title>
    <style>
{style}
    </style>
</head>
<body>
    <h1>OCR API Test Harness <small>(v{version})</small></h1>
{result}{form}
</body>
</html>
"#,
        style = STYLE,
        version = env!("CARGO_PKG_VERSION"),
        result = result,
        form = upload_form(),
    )
}
