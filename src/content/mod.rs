//! Content module - documents, queries and the content store client

pub mod body;
mod client;
pub mod export;
mod image;
mod post;
pub mod queries;

pub use body::{Block, BodyRenderer, Serializers};
pub use client::{fetch_as, ContentError, ContentSource, HttpContentClient, QueryParams};
pub use export::DatasetExport;
pub use image::ImageUrlBuilder;
pub use post::{Author, Comment, ImageRef, Post, PostPath, PostSummary, Reference, Slug};
