//! Print the routes precomputed at startup

use anyhow::Result;

use crate::content::ContentSource;
use crate::helpers::post_url;
use crate::pages::detail;

pub async fn run(source: &dyn ContentSource) -> Result<()> {
    let slugs = detail::static_paths(source).await?;
    println!("Routes ({}):", slugs.len() + 1);
    println!("  /");
    for slug in slugs {
        println!("  {}", post_url(&slug));
    }
    Ok(())
}
