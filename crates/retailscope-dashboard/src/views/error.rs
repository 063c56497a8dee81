use std::fmt::{self, Write};

use super::{escape, layout, Shell};
use crate::boundary::ErrorReport;
use crate::session::CurrentSession;

pub struct ErrorPage<'a> {
    pub report: &'a ErrorReport,
    pub try_again_href: &'a str,
    pub reload_href: &'a str,
    pub show_details: bool,
    pub user: Option<&'a CurrentSession>,
}

/// Page shown by the error boundary.
///
/// # Errors
///
/// Propagates formatter and serialization errors.
pub fn render_error_page(page: &ErrorPage<'_>) -> Result<String, fmt::Error> {
    let report = page.report;
    let report_json = serde_json::to_string_pretty(report).map_err(|_| fmt::Error)?;

    let mut body = String::new();
    writeln!(body, "<div class=\"card\" role=\"alert\">")?;
    writeln!(body, "<h1>Something went wrong</h1>")?;
    writeln!(body, "<p>{}</p>", escape(&report.message))?;
    writeln!(
        body,
        "<p class=\"muted\">Error ID: <code id=\"error-id\">{}</code></p>",
        escape(&report.error_id)
    )?;
    if page.show_details {
        if let Some(details) = &report.details {
            writeln!(
                body,
                "<details open><summary>Details</summary><pre>{}</pre></details>",
                escape(details)
            )?;
        }
    }
    writeln!(
        body,
        "<div class=\"row\"><a href=\"{}\"><button type=\"button\">Try Again</button></a>\
<a href=\"{}\"><button class=\"secondary\" type=\"button\">Reload Page</button></a>\
<button class=\"secondary\" type=\"button\" \
onclick=\"navigator.clipboard.writeText(document.getElementById('error-report').value)\">Copy Error Report</button></div>",
        escape(page.try_again_href),
        escape(page.reload_href)
    )?;
    writeln!(
        body,
        "<textarea id=\"error-report\" rows=\"8\" readonly aria-label=\"Error report\">{}</textarea>",
        escape(&report_json)
    )?;
    writeln!(body, "</div>")?;

    layout(
        &Shell {
            title: "Error",
            user: page.user,
            refresh_secs: None,
        },
        &body,
    )
}

/// Minimal 404 page for unknown retailers and history entries.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn render_not_found(what: &str) -> Result<String, fmt::Error> {
    let mut body = String::new();
    writeln!(
        body,
        "<div class=\"card\"><h1>Not found</h1><p>{}</p><p><a href=\"/dashboard\">Back to the dashboard</a></p></div>",
        escape(what)
    )?;
    layout(
        &Shell {
            title: "Not found",
            ..Shell::default()
        },
        &body,
    )
}
