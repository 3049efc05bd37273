//! Image URL builder for image asset references

use super::ImageRef;
use crate::config::BlogConfig;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Builds CDN URLs for image references
///
/// # Examples
/// ```ignore
/// // asset._ref = "image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg"
/// builder.url(&image) // -> https://cdn.sanity.io/images/<project>/<dataset>/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg
/// ```
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(config: &BlogConfig) -> Self {
        Self {
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
        }
    }

    /// Build the URL for an image, or `None` if it has no parseable asset
    pub fn url(&self, image: &ImageRef) -> Option<String> {
        let asset = image.asset.as_ref()?;
        let (id, dimensions, format) = parse_asset_ref(&asset.id)?;
        Some(format!(
            "{}/{}/{}/{}-{}.{}",
            CDN_BASE, self.project_id, self.dataset, id, dimensions, format
        ))
    }

    /// Like [`url`](Self::url) for an optional image field
    pub fn url_opt(&self, image: Option<&ImageRef>) -> Option<String> {
        image.and_then(|image| self.url(image))
    }
}

/// Split `image-<id>-<width>x<height>-<format>` into its parts
fn parse_asset_ref(reference: &str) -> Option<(&str, &str, &str)> {
    let rest = reference.strip_prefix("image-")?;
    let mut parts = rest.rsplitn(3, '-');
    let format = parts.next()?;
    let dimensions = parts.next()?;
    let id = parts.next()?;

    let (width, height) = dimensions.split_once('x')?;
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if id.is_empty() || format.is_empty() || !numeric(width) || !numeric(height) {
        return None;
    }

    Some((id, dimensions, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Reference;

    fn image(reference: &str) -> ImageRef {
        ImageRef {
            asset: Some(Reference {
                id: reference.to_string(),
            }),
            alt: None,
        }
    }

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new(&BlogConfig {
            project_id: "abc".to_string(),
            dataset: "blog".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_asset_ref() {
        assert_eq!(
            parse_asset_ref("image-Tb9Ew8CX-2000x3000-jpg"),
            Some(("Tb9Ew8CX", "2000x3000", "jpg"))
        );
        assert_eq!(parse_asset_ref("file-abc-pdf"), None);
        assert_eq!(parse_asset_ref("image-abc-big-png"), None);
        assert_eq!(parse_asset_ref("image-abc"), None);
    }

    #[test]
    fn test_url() {
        assert_eq!(
            builder().url(&image("image-a1b2-10x20-png")).as_deref(),
            Some("https://cdn.sanity.io/images/abc/blog/a1b2-10x20.png")
        );
    }

    #[test]
    fn test_missing_asset() {
        assert_eq!(builder().url(&ImageRef::default()), None);
        assert_eq!(builder().url_opt(None), None);
    }
}
