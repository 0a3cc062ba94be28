use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// URL prefix the GeoJSON directory is mounted under.
pub const GEOJSON_ROUTE: &str = "/geojson";

// Characters that cannot appear raw inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Names of the regular files in `dir` ending with `extension`, sorted.
pub async fn list_geojson_files(dir: &Path, extension: &str) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!("skipping non UTF-8 file name in {}", dir.display());
            continue;
        };
        if !name.ends_with(extension) {
            continue;
        }
        // Follows symlinks; dangling ones are skipped.
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(name);
        }
    }

    files.sort();
    tracing::debug!("found {} GeoJSON files in {}", files.len(), dir.display());
    Ok(files)
}

/// Link to a listed file, with the name percent-encoded as one path segment.
pub fn file_url(name: &str) -> String {
    format!("{GEOJSON_ROUTE}/{}", utf8_percent_encode(name, PATH_SEGMENT))
}

/// Index page linking every file and loading them onto a Leaflet map.
pub fn render_index(files: &[String]) -> String {
    let items: String = files
        .iter()
        .map(|name| {
            let escaped = escape_html(name);
            format!(
                "      <li><a href=\"{}\">{escaped}</a></li>\n",
                escape_html(&file_url(name))
            )
        })
        .collect();

    let urls: Vec<String> = files.iter().map(|name| file_url(name)).collect();
    // Kept inside a <script> element, so a literal "</" must not close it.
    let urls_json = serde_json::to_string(&urls)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/");

    INDEX_TEMPLATE
        .replace("{{file_items}}", items.trim_end_matches('\n'))
        .replace("{{file_urls}}", &urls_json)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
