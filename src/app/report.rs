use crate::core::LabeledPost;
use crate::domain::model::format_timestamp;
use std::collections::BTreeMap;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const TEXT_WIDTH: usize = 60;

pub const NO_RESULTS_NOTICE: &str = "No tweets matched the given criteria.";

#[derive(Tabled)]
struct PostRow {
    id: String,
    autor: String,
    fecha: String,
    sentimiento: String,
    #[tabled(display_with = "shorten_text")]
    texto: String,
}

impl From<&LabeledPost> for PostRow {
    fn from(labeled: &LabeledPost) -> Self {
        Self {
            id: labeled.post.id.clone(),
            autor: labeled.post.author_id.clone().unwrap_or_default(),
            fecha: labeled
                .post
                .created_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            sentimiento: labeled.sentiment.to_string(),
            texto: labeled.post.text.clone(),
        }
    }
}

/// Plain-text table for the terminal.
pub fn render_table(posts: &[LabeledPost]) -> String {
    let rows: Vec<PostRow> = posts.iter().map(PostRow::from).collect();
    Table::new(rows).with(Style::psql()).to_string()
}

/// Count per label, e.g. `positivo: 3, negativo: 1, Error: 1`.
pub fn summarize(posts: &[LabeledPost]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for labeled in posts {
        *counts.entry(labeled.sentiment.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(label, count)| format!("{}: {}", label, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn shorten_text(text: &str) -> String {
    shorten(text, TEXT_WIDTH)
}

fn shorten(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let mut cut: String = flat.chars().take(max_chars - 1).collect();
        cut.push('…');
        cut
    }
}
