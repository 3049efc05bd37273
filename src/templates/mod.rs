//! Built-in templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is on for `.html`
//! templates; only the rendered post body is marked `| safe`.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

use crate::comments::FormState;
use crate::config::BlogConfig;
use crate::content::{Comment, ImageUrlBuilder, Post, PostSummary};
use crate::helpers::{date_xml, format_published, html_escape, post_url};

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        // Same entities as the body renderer; leaves `/` in URLs alone
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("medium/layout.html")),
            ("index.html", include_str!("medium/index.html")),
            ("post.html", include_str!("medium/post.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("medium/partials/header.html"),
            ),
            (
                "partials/comment_form.html",
                include_str!("medium/partials/comment_form.html"),
            ),
            (
                "partials/comments.html",
                include_str!("medium/partials/comments.html"),
            ),
        ])?;

        tera.register_filter("post_url", post_url_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Detail page path for a slug
fn post_url_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let slug = tera::try_get_value!("post_url", "value", String, value);
    Ok(Value::String(post_url(&slug)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
}

impl SiteData {
    pub fn new(config: &BlogConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
        }
    }
}

/// One entry on the listing page
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub author_name: String,
    pub author_image: Option<String>,
    pub main_image: Option<String>,
}

impl PostCard {
    pub fn new(post: &PostSummary, images: &ImageUrlBuilder) -> Self {
        let author = post.author.as_ref();
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            slug: post.slug.current.clone(),
            author_name: author.map(|a| a.name.clone()).unwrap_or_default(),
            author_image: images.url_opt(author.and_then(|a| a.image.as_ref())),
            main_image: images.url_opt(post.main_image.as_ref()),
        }
    }
}

/// The post on its detail page
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author_name: String,
    pub author_image: Option<String>,
    pub main_image: Option<String>,
    pub published_at: Option<String>,
    pub published_iso: Option<String>,
    /// Rendered body; already safe HTML
    pub body_html: String,
}

impl PostView {
    pub fn new(
        post: &Post,
        images: &ImageUrlBuilder,
        config: &BlogConfig,
        body_html: String,
    ) -> Self {
        let author = post.author.as_ref();
        let tz = config.tz();
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            author_name: post.author_name().to_string(),
            author_image: images.url_opt(author.and_then(|a| a.image.as_ref())),
            main_image: images.url_opt(post.main_image.as_ref()),
            published_at: post
                .created_at
                .map(|date| format_published(&date, tz, &config.date_format)),
            published_iso: post.created_at.map(|date| date_xml(&date)),
            body_html,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub name: String,
    pub comment: String,
}

impl CommentView {
    pub fn new(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            name: comment.name.clone(),
            comment: comment.comment.clone(),
        }
    }
}

/// The comment form, or the thank-you panel that replaces it
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub submitted: bool,
    pub slug: String,
    pub post_id: String,
    pub name: String,
    pub email: String,
    pub comment: String,
    pub errors: Vec<String>,
}

impl FormView {
    pub fn new(post: &Post, state: &FormState) -> Self {
        let mut view = Self {
            submitted: state.is_submitted(),
            slug: post.slug.current.clone(),
            post_id: post.id.clone(),
            name: String::new(),
            email: String::new(),
            comment: String::new(),
            errors: Vec::new(),
        };

        if let FormState::Unsubmitted { input, errors } = state {
            view.name = input.name.clone();
            view.email = input.email.clone();
            view.comment = input.comment.clone();
            view.errors = errors.iter().map(|e| e.message().to_string()).collect();
        }

        view
    }
}
