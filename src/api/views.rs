//! Server-rendered HTML for the single page.
//!
//! The page has a sidebar (login or navigation plus the API key form) and a
//! main column (the summarization screen). Every piece of user-provided text
//! goes through [`html_escape`].

use super::AppConfig;
use crate::session::{Notice, Page, Session, API_KEY_MISSING};
use std::fmt::Write as _;

const TITLE: &str = "Gemini Text Summarizer";
const LOGIN_PROMPT: &str = "Please log in with your email and password to continue.";

const STYLE: &str = r"
body { margin: 0; display: flex; min-height: 100vh; font-family: system-ui, sans-serif; color: #1f2937; }
aside { width: 20rem; padding: 1.5rem; background: #f3f4f6; box-sizing: border-box; }
main { flex: 1; padding: 2rem 3rem; display: flex; flex-direction: column; }
label { display: block; margin: 0.75rem 0 0.25rem; font-size: 0.9rem; }
input[type=text], input[type=password], textarea { width: 100%; box-sizing: border-box; padding: 0.5rem; }
fieldset { border: none; padding: 0; margin: 0.5rem 0; }
fieldset label { display: flex; gap: 0.5rem; align-items: center; }
button, a.button { margin-top: 0.75rem; padding: 0.5rem 1rem; border: 1px solid #9ca3af; border-radius: 0.4rem; background: #fff; color: inherit; text-decoration: none; cursor: pointer; display: inline-block; }
button:disabled { opacity: 0.6; cursor: progress; }
.notice { margin: 0.75rem 0; padding: 0.75rem 1rem; border-radius: 0.4rem; }
.notice.success { background: #dcfce7; }
.notice.info { background: #dbeafe; }
.notice.warning { background: #fef9c3; }
.notice.error { background: #fee2e2; }
.summary { white-space: pre-wrap; font-family: inherit; }
.muted { color: #6b7280; font-size: 0.85rem; }
footer { margin-top: auto; padding-top: 2rem; color: #6b7280; font-size: 0.85rem; }
";

// Disable the button and swap its label while the blocking request runs.
const BUSY_SCRIPT: &str =
    "var b=this.querySelector('button[type=submit]');b.disabled=true;b.textContent='Summarizing...';";

/// What a single response shows on top of the session itself.
#[derive(Debug, Default)]
pub(crate) struct View {
    pub sidebar_notice: Option<Notice>,
    pub main_notice: Option<Notice>,
    pub text: String,
    pub summary: Option<String>,
}

impl View {
    pub(crate) fn sidebar(notice: Option<Notice>) -> Self {
        Self {
            sidebar_notice: notice,
            ..Self::default()
        }
    }
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render the whole page for `session`.
pub(crate) fn render(config: &AppConfig, session: &Session, view: &View) -> String {
    let sidebar = if session.is_logged_in() {
        navigation(session, view)
    } else {
        login(view)
    };

    let main = if session.is_logged_in() && session.page() == Page::Summarize {
        summarize_screen(session, view)
    } else {
        String::new()
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{TITLE}</title>
<style>{STYLE}</style>
</head>
<body>
<aside>
{sidebar}
</aside>
<main>
{main}
<footer>🔗 Powered by Google's {model}</footer>
</main>
</body>
</html>
"#,
        model = html_escape(config.model()),
    )
}

fn notice(notice: &Notice) -> String {
    format!(
        r#"<div class="notice {}" role="alert">{}</div>"#,
        notice.level.as_str(),
        html_escape(&notice.message)
    )
}

fn optional_notice(value: Option<&Notice>) -> String {
    value.map(notice).unwrap_or_default()
}

fn login(view: &View) -> String {
    format!(
        r#"<form method="post" action="/login">
<h3>Manual Login</h3>
<label for="email">Email</label>
<input id="email" name="email" type="text" autocomplete="username">
<label for="password">Password</label>
<input id="password" name="password" type="password" autocomplete="current-password">
<button type="submit">Login</button>
</form>
{error}
<h2>Navigation</h2>
{info}"#,
        error = optional_notice(view.sidebar_notice.as_ref()),
        info = notice(&Notice::info(LOGIN_PROMPT)),
    )
}

fn navigation(session: &Session, view: &View) -> String {
    let mut html = String::from("<h2>Navigation</h2>\n");

    let _ = write!(
        html,
        r#"<p><strong>Logged in as:</strong> {}</p>
<form method="post" action="/logout"><button type="submit">Logout</button></form>
<form method="post" action="/navigate">
<fieldset>
<legend>Go to</legend>
"#,
        html_escape(session.user_email().unwrap_or_default())
    );

    for page in Page::ALL {
        let checked = if page == session.page() { " checked" } else { "" };
        let _ = writeln!(
            html,
            r#"<label><input type="radio" name="page" value="{}"{checked} onchange="this.form.submit()"> {}</label>"#,
            page.as_str(),
            page.label()
        );
    }

    html.push_str("</fieldset>\n<button type=\"submit\">Go</button>\n</form>\n");

    if session.page() == Page::ApiKey {
        html.push_str(&api_key_form(session, view));
    }

    html
}

// The saved key is never written back into the page.
fn api_key_form(session: &Session, view: &View) -> String {
    let saved = if session.has_api_key() {
        r#"<p class="muted">An API key is saved for this session. Enter a new one to replace it.</p>"#
    } else {
        ""
    };

    format!(
        r#"<h3>Enter your Gemini API Key</h3>
<form method="post" action="/api-key">
<label for="api_key">Gemini API Key (required)</label>
<input id="api_key" name="api_key" type="password" autocomplete="off">
<button type="submit">Save API Key</button>
</form>
{notice}
{saved}
"#,
        notice = optional_notice(view.sidebar_notice.as_ref()),
    )
}

fn summarize_screen(session: &Session, view: &View) -> String {
    if !session.has_api_key() {
        return notice(&Notice::warning(API_KEY_MISSING));
    }

    // The newline right after <textarea> is dropped by HTML parsers, which
    // keeps leading newlines of the text intact.
    let mut html = format!(
        r#"<h1>📝 {TITLE}</h1>
<form method="post" action="/summarize" onsubmit="{BUSY_SCRIPT}">
<label for="text">Paste the text you want to summarize</label>
<textarea id="text" name="text" rows="15">
{text}</textarea>
<button type="submit">Summarize</button>
</form>
{notice}
"#,
        text = html_escape(&view.text),
        notice = optional_notice(view.main_notice.as_ref()),
    );

    if let Some(summary) = &view.summary {
        let _ = write!(
            html,
            r#"<h2>Summary</h2>
<pre class="summary">{}</pre>
<a class="button" href="/summary.txt" download="summary.txt">Download Summary as TXT</a>
"#,
            html_escape(summary)
        );
    }

    html
}
