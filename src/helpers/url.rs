//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that must be escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path of a post's detail page
///
/// # Examples
/// ```ignore
/// post_url("hello world") // -> "/post/hello%20world"
/// ```
pub fn post_url(slug: &str) -> String {
    format!("/post/{}", utf8_percent_encode(slug, SEGMENT))
}
