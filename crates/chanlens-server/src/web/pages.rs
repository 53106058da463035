//! Server-rendered HTML for the login, form and result pages.

use std::fmt::Write as _;

use chanlens_pipeline::RunSummary;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::api::RunLimits;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:640px;margin:2rem auto;padding:0 1rem;color:#1f2328}\
label{display:block;margin-top:1rem;font-weight:600}\
input,textarea{width:100%;padding:.5rem;margin-top:.25rem;box-sizing:border-box}\
button{margin-top:1.25rem;padding:.6rem 1.2rem}\
.error{background:#ffebe9;border:1px solid #ff8182;padding:.75rem;margin:1rem 0}\
.success{background:#dafbe1;border:1px solid #4ac26b;padding:.75rem;margin:1rem 0}\
.warning{background:#fff8c5;border:1px solid #d4a72c;padding:.75rem;margin:1rem 0}\
.log{background:#f6f8fa;padding:.75rem;font-family:ui-monospace,monospace;white-space:pre-wrap}\
.caption{color:#59636e;font-size:.9rem}";

/// Values echoed back into the form after a rejected submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub channel: String,
    pub competitors: String,
    pub days: String,
}

/// How a run submitted from the form ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Failed(String),
    Finished(RunSummary),
}

fn layout(body: &str, show_logout: bool) -> String {
    let logout = if show_logout {
        r#"<form method="post" action="/logout" style="float:right"><button type="submit">Log out</button></form>"#
    } else {
        ""
    };
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>YouTube Competitor Analysis</title><style>{STYLE}</style></head><body>\
         {logout}<h1>YouTube Competitor Analysis</h1>\
         <p class=\"caption\">Generate a Google Slides report comparing your channel against competitors.</p>\
         {body}</body></html>"
    )
}

fn error_block(error: Option<&str>) -> String {
    error
        .map(|message| format!("<div class=\"error\">{}</div>", text(message)))
        .unwrap_or_default()
}

#[must_use]
pub fn login_page(error: Option<&str>) -> String {
    let body = format!(
        "{}<form method=\"post\" action=\"/login\">\
         <label for=\"password\">Password</label>\
         <input id=\"password\" name=\"password\" type=\"password\" placeholder=\"Enter password\" autofocus>\
         <button type=\"submit\">Login</button></form>",
        error_block(error)
    );
    layout(&body, false)
}

#[must_use]
pub fn form_page(
    values: &FormValues,
    error: Option<&str>,
    limits: &RunLimits,
    show_logout: bool,
) -> String {
    let days = if values.days.is_empty() {
        limits.default_days.to_string()
    } else {
        values.days.clone()
    };
    let body = format!(
        "{error}<form method=\"post\" action=\"/run\">\
         <label for=\"channel\">Your Channel</label>\
         <input id=\"channel\" name=\"channel\" placeholder=\"@handle\" value=\"{channel}\">\
         <label for=\"competitors\">Competitor Channels (one per line)</label>\
         <textarea id=\"competitors\" name=\"competitors\" rows=\"7\" \
         placeholder=\"@competitor1&#10;@competitor2&#10;@competitor3&#10;@competitor4\">{competitors}</textarea>\
         <p class=\"caption\">Enter {min}-{max} competitor @handles, one per line.</p>\
         <label for=\"days\">Analysis Window (days)</label>\
         <input id=\"days\" name=\"days\" type=\"number\" min=\"{min_days}\" max=\"{max_days}\" value=\"{days}\">\
         <button type=\"submit\">Generate Report</button></form>",
        error = error_block(error),
        channel = attr(&values.channel),
        competitors = text(&values.competitors),
        min = limits.min_competitors,
        max = limits.max_competitors,
        min_days = crate::api::MIN_DAYS,
        max_days = crate::api::MAX_DAYS,
        days = attr(&days),
    );
    layout(&body, show_logout)
}

#[must_use]
pub fn result_page(progress: &[String], outcome: &RunOutcome, show_logout: bool) -> String {
    let mut body = String::from("<div class=\"log\">");
    for line in progress {
        let _ = writeln!(body, "{}", text(line));
    }
    body.push_str("</div>");

    match outcome {
        RunOutcome::Failed(message) => {
            let _ = write!(body, "<div class=\"error\">{}</div>", text(message));
        }
        RunOutcome::Finished(summary) => {
            if let Some(url) = &summary.report_url {
                let _ = write!(
                    body,
                    "<div class=\"success\">Report generated successfully!</div>\
                     <h3><a href=\"{}\" target=\"_blank\" rel=\"noopener\">Open Google Slides Report</a></h3>",
                    attr(url)
                );
            } else {
                body.push_str(
                    "<div class=\"warning\">Pipeline completed but no Slides report was generated. \
                     Check that GOOGLE_SLIDES_TEMPLATE_ID is set.</div>",
                );
            }
            let _ = write!(
                body,
                "<p class=\"caption\">Channels analyzed: {} | Videos: {} | Quota: ~{} units</p>",
                summary.channels_fetched, summary.total_videos, summary.quota_estimate
            );
        }
    }
    body.push_str("<p><a href=\"/\">Run another analysis</a></p>");
    layout(&body, show_logout)
}
