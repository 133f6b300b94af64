//! The document around the page content for full page builds.
//!
//! Taken from `layout/document.html` in the template store if
//! present. The page content is put in last, so placeholders in it
//! are never touched by the chrome's substitution.

use crate::acontext::PageContext;
use crate::config::{ADMIN_PANEL, DEBUG_PANEL};
use crate::controller::control_values;
use crate::datamap::DataMap;
use crate::event::EventOutcome;
use crate::language::Language;
use crate::pages::PageId;
use crate::render::{token, Layer, RenderData, RenderEngine};
use crate::webutils::html_escape;

pub const DOCUMENT_TEMPLATE: &str = "layout/document.html";

pub const BUILTIN_DOCUMENT: &str = "<!DOCTYPE html>
<html lang=\"{{lang}}\">
<head>
{{head-meta}}
<title>{{page-title}}</title>
{{icon-links}}
<link rel=\"stylesheet\" href=\"/static/main.css\">
</head>
<body>
<main id=\"content\">{{content}}</main>
{{panels}}
<script nonce=\"{{nonce}}\" src=\"/static/app.js\"></script>
</body>
</html>
";

const HEAD_META: &str = "<meta charset=\"utf-8\">\
                         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">";

const ICON_LINKS: &str = "<link rel=\"icon\" href=\"/static/favicon.ico\" sizes=\"any\">\
                          <link rel=\"icon\" href=\"/static/icon.svg\" type=\"image/svg+xml\">\
                          <link rel=\"apple-touch-icon\" href=\"/static/apple-touch-icon.png\">";

fn outcome_str(outcome: &EventOutcome) -> String {
    match outcome {
        EventOutcome::NoEvent => "none".into(),
        EventOutcome::Executed(name) => format!("executed {name}"),
        EventOutcome::Ignored(name) => format!("ignored {name}"),
    }
}

fn debug_panel(page: PageId, outcome: &EventOutcome, context: &PageContext) -> String {
    let rows = [
        ("page", page.as_str().to_string()),
        ("method", context.method().as_str().to_string()),
        ("path", context.path().to_string()),
        ("event", outcome_str(outcome)),
        ("language", context.lang().as_str().to_string()),
        ("user", context.user().unwrap_or("-").to_string()),
        ("dictionary entries", context.dictionary().entries().len().to_string()),
    ];
    let mut out = String::from("<aside class=\"panel debug-panel\"><dl>");
    for (k, v) in rows {
        out.push_str(&format!("<dt>{k}</dt><dd>{}</dd>", html_escape(&v)));
    }
    out.push_str("</dl></aside>");
    out
}

fn admin_panel(context: &PageContext) -> String {
    let mut out = String::from("<aside class=\"panel admin-panel\"><ul>");
    for id in [PageId::Admin, PageId::Dashboard, PageId::Calendar] {
        let label = html_escape(&context.text(&format!("link-{}", id.as_str()))).into_owned();
        out.push_str(&format!("<li><a href=\"{}\">{label}</a></li>", id.path()));
    }
    out.push_str("</ul></aside>");
    out
}

/// The dev and admin panels the config asks for; the admin panel only
/// for admins.
pub fn panels(page: PageId, outcome: &EventOutcome, context: &PageContext) -> String {
    let config = context.config();
    let mut out = String::new();
    if config.flag(DEBUG_PANEL) {
        out.push_str(&debug_panel(page, outcome, context));
    }
    if config.flag(ADMIN_PANEL) && context.user().map_or(false, |u| config.is_admin(u)) {
        out.push_str(&admin_panel(context));
    }
    out
}

fn head_meta(context: &PageContext) -> String {
    let mut meta = HEAD_META.to_string();
    if let Some(desc) = context.dictionary().get_text("meta-description") {
        meta.push_str(&format!("<meta name=\"description\" content=\"{}\">",
                               html_escape(desc)));
    }
    meta
}

pub fn document(
    engine: &RenderEngine,
    context: &PageContext,
    page: PageId,
    outcome: &EventOutcome,
    content: &str,
) -> String {
    let source = engine.store().get(DOCUMENT_TEMPLATE)
        .unwrap_or_else(|| BUILTIN_DOCUMENT.to_string());
    let title_key = format!("title-{}", page.as_str());
    let page_title = match context.dictionary().get_text(&title_key) {
        Some(title) => format!("{} | {{{{site-name}}}}", html_escape(title)),
        None => "{{site-name}}".to_string(),
    };
    let chrome = DataMap::new()
        .with("page-title", page_title)
        .with("head-meta", head_meta(context))
        .with("icon-links", ICON_LINKS)
        .with("panels", panels(page, outcome, context));
    let mut data = RenderData::new();
    data.extend(Layer::Data, &chrome)
        .extend(Layer::Dictionary, context.dictionary().entries())
        .extend(Layer::Control, &control_values(page, context));
    let html = engine.render_str(&source, &data);
    html.replace(&token("content"), content)
}
