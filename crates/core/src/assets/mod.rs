//! Texture ownership and cover-art loading.

pub(crate) mod http;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::scene::Disc;

pub use http::HttpCoverLoader;

/// Decoded RGBA8 image handed over by a [`CoverLoader`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for CoverImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

/// Owning reference to a live texture.
///
/// Deliberately neither `Clone` nor `Copy`: the only way to end its life is
/// [`TextureStore::dispose`], which consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct TextureHandle {
    id: TextureId,
}

impl TextureHandle {
    pub fn id(&self) -> TextureId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub source: String,
    pub width: u32,
    pub height: u32,
}

/// Registry of textures uploaded for the frame sink.
#[derive(Debug, Default)]
pub struct TextureStore {
    next_id: u64,
    live: HashMap<TextureId, TextureInfo>,
    created: u64,
    disposed: u64,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, source: &str, image: &CoverImage) -> TextureHandle {
        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.live.insert(
            id,
            TextureInfo {
                source: source.to_string(),
                width: image.width,
                height: image.height,
            },
        );
        self.created += 1;
        TextureHandle { id }
    }

    pub fn dispose(&mut self, handle: TextureHandle) {
        if self.live.remove(&handle.id).is_some() {
            self.disposed += 1;
            tracing::debug!(texture = handle.id.0, "texture disposed");
        } else {
            tracing::warn!(texture = handle.id.0, "disposing unknown texture");
        }
    }

    pub fn info(&self, handle: &TextureHandle) -> Option<&TextureInfo> {
        self.live.get(&handle.id)
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn disposed(&self) -> u64 {
        self.disposed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoverRequestId(pub u64);

/// Fetches and decodes cover images out of band.
///
/// Implementations must eventually post exactly one
/// [`AppEvent::CoverLoaded`](crate::AppEvent::CoverLoaded) per request.
pub trait CoverLoader {
    fn request(&mut self, id: CoverRequestId, url: &str);
}

/// Catalogue thumbnails come at 56x56; the same path serves 500x500.
pub fn high_res_cover_url(url: &str) -> String {
    url.replace("56x56", "500x500")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverOutcome {
    Applied,
    /// A newer request was issued; this image was dropped.
    Superseded,
    Failed(String),
}

/// Issues cover requests and applies their completions.
///
/// Only the most recently issued request may change the disc. Completions of
/// older requests are dropped before any texture is created for them, so a
/// request that loses the race never leaks.
#[derive(Debug, Default)]
pub struct AlbumArtLoader {
    last_issued: u64,
    last_applied: Option<CoverRequestId>,
}

impl AlbumArtLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, cover_url: &str, loader: &mut dyn CoverLoader) -> CoverRequestId {
        self.last_issued += 1;
        let id = CoverRequestId(self.last_issued);
        let url = high_res_cover_url(cover_url);
        tracing::debug!(request = id.0, %url, "requesting cover");
        loader.request(id, &url);
        id
    }

    /// Retires every request issued so far. Used when the track they belong to
    /// is released without a successor.
    pub fn invalidate(&mut self) {
        self.last_issued += 1;
    }

    pub fn last_applied(&self) -> Option<CoverRequestId> {
        self.last_applied
    }

    /// Merges a finished request into the disc. A failure leaves the current
    /// texture untouched.
    pub fn complete(
        &mut self,
        id: CoverRequestId,
        result: std::result::Result<CoverImage, String>,
        disc: &mut Disc,
        textures: &mut TextureStore,
    ) -> CoverOutcome {
        let image = match result {
            Ok(image) => image,
            Err(message) => {
                tracing::warn!(request = id.0, %message, "cover load failed");
                return CoverOutcome::Failed(message);
            }
        };

        if id.0 < self.last_issued {
            tracing::debug!(request = id.0, "dropping superseded cover");
            return CoverOutcome::Superseded;
        }

        let handle = textures.create(&format!("cover#{}", id.0), &image);
        disc.install_texture(handle, textures);
        self.last_applied = Some(id);
        CoverOutcome::Applied
    }
}
