//! HTML rendering for the query page

use docquery_core::Response;
use docquery_rag::format_response;

pub const DEFAULT_TITLE: &str = "Document Query Interface";

/// What the page shows below the form
#[derive(Debug)]
pub enum Outcome<'a> {
    /// Fresh page, nothing submitted yet
    Blank,
    /// Validation message for a rejected submission
    Invalid(&'a str),
    /// Answer and sources for a submitted query
    Answered(&'a Response),
    /// The query failed; the message is shown as-is
    Failed(&'a str),
}

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
input[type=text]{width:100%;padding:.5rem;box-sizing:border-box}\
button{margin-top:.5rem;padding:.4rem 1rem}\
.error{color:#a00;background:#fee;padding:.5rem;border-radius:4px}\
pre{white-space:pre-wrap;background:#f6f6f6;padding:.75rem;border-radius:4px}";

/// Render the full page: title, form, and the outcome of the last submission
pub fn render_page(title: &str, query: &str, outcome: &Outcome<'_>) -> String {
    let mut body = String::new();

    body.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
    body.push_str(&format!(
        "<form method=\"post\" action=\"/\">\n\
         <label for=\"query\">Enter your query:</label>\n\
         <input type=\"text\" id=\"query\" name=\"query\" value=\"{}\">\n\
         <button type=\"submit\">Submit</button>\n\
         </form>\n",
        escape_html(query)
    ));

    match outcome {
        Outcome::Blank => {}
        Outcome::Invalid(message) | Outcome::Failed(message) => {
            body.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(message)));
        }
        Outcome::Answered(response) => {
            body.push_str("<h3>Response</h3>\n");
            body.push_str(&format!("<p>{}</p>\n", escape_html(&response.response)));
            body.push_str("<h3>Sources</h3>\n");
            body.push_str(&format!(
                "<pre>{}</pre>\n",
                escape_html(&format_response(response, true))
            ));
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
