use crate::error::Result;
use crate::state::AppState;
use axum::extract::State;
use axum::response::Html;
use snipdeck_core::Command;

/// Landing page listing the most viewed commands.
pub async fn landing_page_handler(State(state): State<AppState>) -> Result<Html<String>> {
    let commands = state.catalog().trending().await?;
    Ok(Html(render_landing_page(&commands, state.base_url())))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_landing_page(commands: &[Command], base_url: &str) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>snipdeck</title>\n</head>\n<body>\n<h1>Most viewed commands</h1>\n",
    );

    if commands.is_empty() {
        html.push_str("<p>No commands yet.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for command in commands {
            html.push_str(&format!(
                "<li><a href=\"{link}\">{name}</a> by {author}: {views} views, {likes} likes</li>\n",
                link = escape_html(&command.short_id.raw_link(base_url)),
                name = escape_html(&command.name),
                author = escape_html(&command.author),
                views = command.views,
                likes = command.likes,
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
