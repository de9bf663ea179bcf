//! fetch_website plugin: fetches a page and returns its main content
//! as markdown.
//!
//! The page is parsed with a real HTML parser, then reduced to the most
//! specific content container present: a single `<article>`, else
//! `<main>`, else `<body>`. Script and style subtrees are skipped.

use anyhow::{Context, Result};
use html_parser::{Dom, Element, Node};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Plugin, Toolkit};

/// Plugin that fetches a website's main content as markdown.
pub struct FetchWebsite {
    client: reqwest::Client,
}

impl FetchWebsite {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for FetchWebsite {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct FetchWebsiteArgs {
    url: String,
}

#[async_trait::async_trait]
impl Plugin for FetchWebsite {
    fn name(&self) -> &str {
        "fetch_website"
    }

    fn description(&self) -> &str {
        "Fetch website's main content from the internet as markdown"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The url of the website to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, arguments_raw: &str, toolkit: &Toolkit) -> Result<String> {
        let args: FetchWebsiteArgs =
            serde_json::from_str(arguments_raw).context("invalid fetch_website arguments")?;
        toolkit.debug(&format!("Fetching: {}", args.url));

        // A failed request degrades to a result the model can react to
        // instead of aborting the exchange.
        let html = match self.fetch(&args.url).await {
            Ok(body) => body,
            Err(e) => return Ok(format!("Failed to fetch {}: {}", args.url, e)),
        };

        // The parser is strict (it rejects fragments rooted at <body>);
        // an unparseable page also degrades to a result string.
        let markdown = match html_to_markdown(&html) {
            Ok(md) => md,
            Err(e) => return Ok(format!("Failed to parse {}: {:#}", args.url, e)),
        };
        toolkit.debug(&format!("Result: {} chars", markdown.len()));
        Ok(markdown)
    }
}

impl FetchWebsite {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Converts an HTML document to markdown, keeping only the main content.
fn html_to_markdown(html: &str) -> Result<String> {
    let dom = Dom::parse(html).context("failed to parse HTML")?;

    let content = ["article", "main", "body"]
        .iter()
        .find_map(|tag| find_element(&dom.children, tag));

    let mut out = String::new();
    match content {
        Some(element) => render_children(&element.children, &mut out),
        // Fragment without a body wrapper; render everything.
        None => render_children(&dom.children, &mut out),
    }
    Ok(collapse_blank_lines(out.trim()))
}

/// Depth-first search for the first element with the given tag name.
fn find_element<'a>(nodes: &'a [Node], tag: &str) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.name.eq_ignore_ascii_case(tag) {
                return Some(element);
            }
            if let Some(found) = find_element(&element.children, tag) {
                return Some(found);
            }
        }
    }
    None
}

fn render_children(nodes: &[Node], out: &mut String) {
    for node in nodes {
        render_node(node, out);
    }
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                if !out.is_empty() && !out.ends_with(['\n', ' ', '(', '[']) {
                    out.push(' ');
                }
                out.push_str(text);
            }
        }
        Node::Element(element) => render_element(element, out),
        Node::Comment(_) => {}
    }
}

fn render_element(element: &Element, out: &mut String) {
    match element.name.to_ascii_lowercase().as_str() {
        "script" | "style" | "noscript" => {}
        name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            out.push_str("\n\n");
            out.push_str(&"#".repeat(level));
            out.push(' ');
            render_children(&element.children, out);
            out.push_str("\n\n");
        }
        "a" => {
            let href = element
                .attributes
                .get("href")
                .and_then(|v| v.as_deref())
                .unwrap_or_default();
            out.push_str(" [");
            render_children(&element.children, out);
            out.push_str(&format!("]({href})"));
        }
        "li" => {
            out.push_str("\n- ");
            render_children(&element.children, out);
        }
        "br" => out.push('\n'),
        "p" | "div" | "section" | "ul" | "ol" | "blockquote" | "table" | "tr" => {
            out.push_str("\n\n");
            render_children(&element.children, out);
            out.push_str("\n\n");
        }
        _ => render_children(&element.children, out),
    }
}

/// Squeezes runs of blank lines down to a single blank line.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}
