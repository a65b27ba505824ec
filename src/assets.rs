//! Sprite assets
//!
//! A fixed manifest of three images. The browser build fetches all of them
//! concurrently and only starts the game once every sprite has decoded.
//! Drawing code asks the cache whether a sprite is ready and skips it if not.

use crate::error::{Error, Result};
pub use crate::sim::SpriteKey;

/// Default asset directory, relative to the page
pub const DEFAULT_ASSET_BASE: &str = "static/driveAway";

/// Sprite key to relative URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    paths: [String; 3],
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::with_base(DEFAULT_ASSET_BASE)
    }
}

impl AssetManifest {
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            paths: SpriteKey::ALL.map(|key| format!("{}/{}.png", base, key.as_str())),
        }
    }

    pub fn path(&self, key: SpriteKey) -> &str {
        &self.paths[key.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteKey, &str)> {
        SpriteKey::ALL.into_iter().map(|key| (key, self.path(key)))
    }
}

/// Decoded RGBA8 pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SpriteImage {
    /// Decode PNG bytes
    pub fn decode(key: SpriteKey, bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|source| Error::AssetDecode { key, source })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            rgba: image.into_raw(),
        })
    }

    /// Single-color image
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (width * height) as usize;
        Self {
            width,
            height,
            rgba: color.repeat(pixels),
        }
    }
}

/// Loaded sprites, one slot per key
#[derive(Debug, Clone, Default)]
pub struct AssetCache {
    sprites: [Option<SpriteImage>; 3],
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SpriteKey, image: SpriteImage) {
        self.sprites[key.index()] = Some(image);
    }

    pub fn get(&self, key: SpriteKey) -> Option<&SpriteImage> {
        self.sprites[key.index()].as_ref()
    }

    pub fn is_ready(&self, key: SpriteKey) -> bool {
        self.get(key).is_some()
    }

    pub fn loaded_count(&self) -> usize {
        self.sprites.iter().filter(|s| s.is_some()).count()
    }

    /// Start gate: true once every manifest sprite is loaded
    pub fn all_ready(&self) -> bool {
        self.loaded_count() == SpriteKey::ALL.len()
    }

    pub fn missing(&self) -> Vec<SpriteKey> {
        SpriteKey::ALL
            .into_iter()
            .filter(|key| !self.is_ready(*key))
            .collect()
    }
}

/// Fetch and decode every sprite in the manifest
///
/// All requests are issued before the first one is awaited. There is no
/// timeout: a request that never settles keeps the game in `Loading`.
#[cfg(target_arch = "wasm32")]
pub async fn load_all(manifest: &AssetManifest) -> Result<AssetCache> {
    let window = web_sys::window().ok_or_else(|| Error::Platform("no window".into()))?;

    let pending: Vec<(SpriteKey, js_sys::Promise)> = manifest
        .iter()
        .map(|(key, path)| (key, window.fetch_with_str(path)))
        .collect();

    let mut cache = AssetCache::new();
    for (key, request) in pending {
        let bytes = fetch_bytes(key, request).await?;
        cache.insert(key, SpriteImage::decode(key, &bytes)?);
        log::info!(
            "Loaded sprite {} ({}/{})",
            key.as_str(),
            cache.loaded_count(),
            SpriteKey::ALL.len()
        );
    }

    Ok(cache)
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(key: SpriteKey, request: js_sys::Promise) -> Result<Vec<u8>> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |e: JsValue| Error::AssetFetch {
        key,
        message: format!("{:?}", e),
    };

    let response: web_sys::Response = JsFuture::from(request)
        .await
        .map_err(fetch_error)?
        .dyn_into()
        .map_err(fetch_error)?;

    if !response.ok() {
        return Err(Error::AssetFetch {
            key,
            message: format!("HTTP {}", response.status()),
        });
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}
