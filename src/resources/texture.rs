use anyhow::*;

#[cfg(target_arch = "wasm32")]
fn format_url(root: &str, file_name: &str) -> Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow!("No browser window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow!("Page origin unavailable: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root.trim_matches('/')))?;
    Ok(base.join(file_name)?)
}

/// Reads `<root>/<file_name>`: from disk natively, over HTTP below the page origin
/// on the web.
pub async fn load_binary(root: &str, file_name: &str) -> Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        reqwest::get(url.clone())
            .await?
            .error_for_status()
            .with_context(|| format!("Fetching {url}"))?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(root).join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Reading {}", path.display()))?
    };

    Ok(data)
}

/// Decodes an image file, guessing the format from its content.
pub async fn load_texture_image(root: &str, file_name: &str) -> Result<image::DynamicImage> {
    let data = load_binary(root, file_name).await?;
    image::load_from_memory(&data).with_context(|| format!("Decoding texture {file_name}"))
}
