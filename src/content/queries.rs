//! GROQ queries issued against the content store

/// Every post, with what the listing page shows
pub const ALL_POSTS: &str = r#"*[_type == "post"]{
  _id,
  title,
  slug,
  author -> {
    name,
    image
  },
  description,
  mainImage
}"#;

/// Every post's id and slug, for route precomputation
pub const POST_SLUGS: &str = r#"*[_type == "post"]{
  _id,
  slug {
    current
  }
}"#;

/// One post by `$slug`, with its approved comments
pub const POST_BY_SLUG: &str = r#"*[_type == "post" && slug.current == $slug][0]{
  _id,
  _createdAt,
  title,
  author -> {
    name,
    image
  },
  'comments': *[
    _type == "comment" &&
    post._ref == ^._id &&
    approved == true
  ],
  description,
  mainImage,
  slug,
  body
}"#;
