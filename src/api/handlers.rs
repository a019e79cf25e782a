use std::path::{Path, PathBuf};

use base64::Engine;
use warp::reject::Rejection;

use crate::constants::RECIPE_IMAGE_DIR;
use crate::cryptography::generate_token;
use crate::error::{ApiError, TypeError};

pub mod catalog;
pub mod recipes;
pub mod users;

pub(crate) fn reject(e: ApiError) -> Rejection {
    warp::reject::custom(e)
}

pub fn media_root() -> PathBuf {
    std::env::var("MEDIA_ROOT")
        .unwrap_or_else(|_| String::from("./media"))
        .into()
}

/// Splits an inline `data:image/<ext>;base64,<payload>` value into its
/// extension and decoded bytes.
pub fn parse_data_uri(value: &str) -> Result<(String, Vec<u8>), TypeError> {
    let rest = value
        .strip_prefix("data:image/")
        .ok_or_else(|| TypeError::new("Invalid image payload"))?;
    let (ext, data) = rest
        .split_once(";base64,")
        .ok_or_else(|| TypeError::new("Invalid image payload"))?;

    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TypeError::new("Invalid image type"));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|_| TypeError::new("Invalid base64 image data"))?;

    Ok((ext.to_string(), bytes))
}

/// Decodes an inline image payload and writes it under `root`,
/// returning the stored path relative to `root`.
pub async fn store_recipe_image(data_uri: &str, root: &Path) -> Result<String, ApiError> {
    let (ext, bytes) = parse_data_uri(data_uri).map_err(Into::<ApiError>::into)?;

    let dir = root.join(RECIPE_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|_| ApiError::internal("Could not create media directory"))?;

    let filename = format!("{}.{}", generate_token(16), ext);
    tokio::fs::write(dir.join(&filename), bytes)
        .await
        .map_err(|_| ApiError::internal("Could not store image"))?;

    Ok(format!("{RECIPE_IMAGE_DIR}/{filename}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_roundtrip_decodes_payload() {
        let (ext, bytes) = parse_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(ext, "png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn data_uri_without_prefix_is_rejected() {
        assert!(parse_data_uri("image/png;base64,aGVsbG8=").is_err());
        assert!(parse_data_uri("data:text/plain;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn data_uri_with_bad_base64_is_rejected() {
        assert!(parse_data_uri("data:image/png;base64,???").is_err());
    }

    #[test]
    fn data_uri_with_odd_extension_is_rejected() {
        assert!(parse_data_uri("data:image/p/ng;base64,aGVsbG8=").is_err());
    }

    #[tokio::test]
    async fn stored_image_lands_under_the_image_dir() {
        let root = std::env::temp_dir().join(format!("media-{}", generate_token(8)));

        let path = store_recipe_image("data:image/png;base64,aGVsbG8=", &root)
            .await
            .unwrap();
        assert!(path.starts_with(RECIPE_IMAGE_DIR));
        assert!(path.ends_with(".png"));

        let stored = tokio::fs::read(root.join(&path)).await.unwrap();
        assert_eq!(stored, b"hello");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
