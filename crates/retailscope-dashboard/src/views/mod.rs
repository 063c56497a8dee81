//! Server-rendered HTML.
//!
//! Pages are assembled with `std::fmt::Write`; every interpolated value goes
//! through [`escape`]. Render functions return `fmt::Result` so a failed
//! write surfaces as a handler error caught by the error boundary.

pub mod dashboard;
pub mod error;
pub mod login;
pub mod panel;
pub mod product;

use std::fmt::{self, Write};

use crate::session::CurrentSession;

const STYLES: &str = r"
*{box-sizing:border-box}
body{margin:0;font-family:system-ui,-apple-system,Segoe UI,Roboto,sans-serif;background:#f8fafc;color:#0f172a}
a{color:#2563eb;text-decoration:none}
a:hover{text-decoration:underline}
header.top{display:flex;justify-content:space-between;align-items:center;padding:12px 24px;background:#0f172a;color:#f8fafc}
header.top a{color:#f8fafc}
main{max-width:1100px;margin:0 auto;padding:24px}
.card{background:#fff;border:1px solid #e2e8f0;border-radius:8px;padding:16px;margin-bottom:16px}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(200px,1fr));gap:12px}
.muted{color:#64748b;font-size:.9em}
.error{background:#fef2f2;border:1px solid #fecaca;color:#991b1b;border-radius:6px;padding:12px;margin:12px 0}
.notice{background:#eff6ff;border:1px solid #bfdbfe;border-radius:6px;padding:12px;margin:12px 0}
.field-error{color:#b91c1c;font-size:.85em}
input[type=text],input[type=url],input[type=password],input[type=number]{width:100%;padding:8px;border:1px solid #cbd5e1;border-radius:6px}
button{padding:8px 14px;border:0;border-radius:6px;background:#2563eb;color:#fff;cursor:pointer}
button.secondary{background:#e2e8f0;color:#0f172a}
button:disabled{opacity:.5;cursor:not-allowed}
form.inline{display:inline}
.row{display:flex;gap:8px;align-items:center}
.price{font-size:1.4em;font-weight:600}
.mrp{text-decoration:line-through;color:#64748b;margin-left:8px}
.discount{color:#15803d;font-weight:600;margin-left:8px}
.carousel img.main{width:100%;max-height:420px;object-fit:contain;background:#f1f5f9;border-radius:6px}
.thumbs{display:flex;gap:6px;flex-wrap:wrap;margin-top:8px}
.thumbs img{width:56px;height:56px;object-fit:cover;border:2px solid transparent;border-radius:4px}
.thumbs a.active img{border-color:#2563eb}
table.pairs{width:100%;border-collapse:collapse}
table.pairs th{text-align:left;width:35%;color:#475569;font-weight:500}
table.pairs td,table.pairs th{padding:6px;border-bottom:1px solid #f1f5f9;vertical-align:top}
pre{white-space:pre-wrap;word-break:break-all;background:#0f172a;color:#e2e8f0;padding:12px;border-radius:6px;font-size:.8em}
textarea{width:100%;font-family:monospace;font-size:.8em}
";

/// Escapes text for use in element content and quoted attribute values.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Options for the outer page shell.
#[derive(Debug, Default)]
pub struct Shell<'a> {
    pub title: &'a str,
    pub user: Option<&'a CurrentSession>,
    /// Seconds until the browser re-requests the page.
    pub refresh_secs: Option<u32>,
}

/// Wraps `body` in the shared document shell.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn layout(shell: &Shell<'_>, body: &str) -> Result<String, fmt::Error> {
    let mut out = String::with_capacity(body.len() + STYLES.len() + 512);
    writeln!(out, "<!doctype html>")?;
    writeln!(out, "<html lang=\"en\"><head><meta charset=\"utf-8\">")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    )?;
    if let Some(secs) = shell.refresh_secs {
        writeln!(out, "<meta http-equiv=\"refresh\" content=\"{secs}\">")?;
    }
    writeln!(out, "<title>{} \u{b7} RetailScope</title>", escape(shell.title))?;
    writeln!(out, "<style>{STYLES}</style></head><body>")?;
    write!(out, "<header class=\"top\"><a href=\"/dashboard\"><strong>RetailScope</strong></a>")?;
    if let Some(user) = shell.user {
        write!(
            out,
            "<div class=\"row\"><span class=\"muted\">Signed in as {} since {}</span>\
<form class=\"inline\" method=\"post\" action=\"/logout\"><button class=\"secondary\" type=\"submit\">Log out</button></form></div>",
            escape(&user.username),
            user.signed_in_at.format("%H:%M UTC")
        )?;
    }
    writeln!(out, "</header>")?;
    writeln!(out, "<main>{body}</main>")?;
    writeln!(out, "</body></html>")?;
    Ok(out)
}

/// Builds `path` plus an optional query string.
#[must_use]
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_and_quotes() {
        assert_eq!(
            escape(r#"<a href="x" onclick='y'>&</a>"#),
            "&lt;a href=&quot;x&quot; onclick=&#39;y&#39;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn layout_includes_title_and_refresh() {
        let html = layout(
            &Shell {
                title: "Amazon <test>",
                user: None,
                refresh_secs: Some(2),
            },
            "<p>body</p>",
        )
        .unwrap();
        assert!(html.contains("<title>Amazon &lt;test&gt;"));
        assert!(html.contains("http-equiv=\"refresh\" content=\"2\""));
        assert!(html.contains("<p>body</p>"));
        assert!(!html.contains("Log out"));
    }

    #[test]
    fn with_query_omits_empty_query() {
        assert_eq!(with_query("/retailers/amazon", ""), "/retailers/amazon");
        assert_eq!(with_query("/retailers/amazon", "img=1"), "/retailers/amazon?img=1");
    }
}
