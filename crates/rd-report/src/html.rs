//! Standalone HTML pages wrapping a rendered SVG.

use crate::error::Result;
use crate::figure::Figure;
use tracing::info;

const PAGE_CSS: &str = "body{margin:0;padding:1.5rem;font-family:sans-serif;background:#fafafa}\
figure{margin:0 auto;display:table;background:#fff;padding:1rem;box-shadow:0 1px 3px rgba(0,0,0,.15)}\
figcaption{text-align:center;color:#333;margin-top:.5rem}";

/// Render `fig` as an HTML page titled and captioned with `name`. The
/// figure data is embedded as JSON next to the inline SVG.
pub fn render_html_page(fig: &Figure, name: &str) -> Result<String> {
    let svg = fig.render_svg()?;
    let data = match fig {
        Figure::Heatmap(f) => serde_json::to_string(f)?,
        Figure::Line(f) => serde_json::to_string(f)?,
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{name}</title>
<style>{css}</style>
</head>
<body>
<figure>
{svg}
<figcaption>{name}</figcaption>
</figure>
<script type="application/json" id="figure-data">{data}</script>
</body>
</html>
"#,
        name = html_escape(name),
        css = PAGE_CSS,
        svg = svg,
        data = script_escape(&data),
    );

    let output = if cfg!(debug_assertions) {
        html
    } else {
        let cfg = minify_html::Cfg {
            minify_css: true,
            ..Default::default()
        };
        String::from_utf8(minify_html::minify(html.as_bytes(), &cfg)).unwrap_or(html)
    };

    info!(bytes = output.len(), "Rendered HTML figure page");
    Ok(output)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Keep embedded JSON from closing its script element.
fn script_escape(s: &str) -> String {
    s.replace("</", "<\\/")
}
