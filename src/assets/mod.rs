//! # Asset Cache & Loader
//!
//! Fetches 3D models and textures by URL, keeps one canonical copy per URL,
//! and hands every consumer its own clone of a model.
//!
//! ## Key Components
//!
//! - [`AssetCache`] - URL-keyed cache with coalesced in-flight loads
//! - [`AssetFetcher`] - where bytes come from ([`MemoryFetcher`], [`FileFetcher`],
//!   and `HttpFetcher` with the `http` feature)
//! - [`parse_obj`] - Wavefront OBJ parsing
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use furnish::assets::{AssetCache, FileFetcher};
//!
//! let cache = AssetCache::new(Arc::new(FileFetcher::with_root("assets")));
//! let chair = pollster::block_on(cache.load_model("chair.obj")).unwrap();
//! println!("{} meshes", chair.meshes.len());
//! ```

pub mod cache;
pub mod fetch;
pub mod obj;

pub use cache::AssetCache;
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{AssetFetcher, FileFetcher, MemoryFetcher};
pub use obj::parse_obj;

/// Shared test assets: a two-part sofa model and its texture variants.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::HashMap;

    use futures::channel::oneshot;
    use futures::future::{BoxFuture, FutureExt};
    use parking_lot::Mutex;

    use crate::catalog::{Product, ProductTexture};
    use crate::error::LoadError;

    use super::{AssetFetcher, MemoryFetcher};

    pub const SOFA_URL: &str = "mem://sofa.obj";
    pub const SOFA_LEATHER_URL: &str = "mem://sofa_leather.obj";

    pub const CHAIR_OBJ: &str = "\
o seat
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
o back
v 0 0 0
v 1 0 0
v 1 1 0
vt 0 0
vt 1 0
vt 1 1
f 5/5 6/6 7/7
";

    pub fn png(rgba: [u8; 4]) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .unwrap();
        bytes
    }

    fn texture(id: &str) -> ProductTexture {
        ProductTexture {
            id: id.to_string(),
            name: id.to_string(),
            thumbnail_url: format!("mem://{}_thumb.png", id),
            diffuse_url: format!("mem://{}.png", id),
            normal_url: None,
            roughness_url: None,
            model_url: None,
        }
    }

    /// Sofa with three variants: `linen` (diffuse only, the default),
    /// `velvet` (all three maps) and `leather` (its own model).
    pub fn sofa() -> Product {
        let mut velvet = texture("velvet");
        velvet.normal_url = Some("mem://velvet_normal.png".to_string());
        velvet.roughness_url = Some("mem://velvet_rough.png".to_string());
        let mut leather = texture("leather");
        leather.model_url = Some(SOFA_LEATHER_URL.to_string());

        Product {
            id: "sofa-01".to_string(),
            name: "Harbor Sofa".to_string(),
            price: 899.0,
            model_url: Some(SOFA_URL.to_string()),
            textures: vec![texture("linen"), velvet, leather],
            default_texture_id: "linen".to_string(),
        }
    }

    pub fn sofa_fetcher() -> MemoryFetcher {
        let fetcher = MemoryFetcher::new();
        fetcher.insert(SOFA_URL, CHAIR_OBJ);
        fetcher.insert(SOFA_LEATHER_URL, CHAIR_OBJ);
        fetcher.insert("mem://linen.png", png([230, 220, 200, 255]));
        fetcher.insert("mem://velvet.png", png([120, 20, 60, 255]));
        fetcher.insert("mem://velvet_normal.png", png([128, 128, 255, 255]));
        fetcher.insert("mem://velvet_rough.png", png([90, 90, 90, 255]));
        fetcher.insert("mem://leather.png", png([90, 50, 20, 255]));
        fetcher
    }

    /// Memory fetcher whose responses for gated URLs wait until the test
    /// releases them.
    pub struct GatedFetcher {
        pub inner: MemoryFetcher,
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    }

    impl GatedFetcher {
        pub fn new(inner: MemoryFetcher) -> Self {
            Self {
                inner,
                gates: Mutex::new(HashMap::new()),
            }
        }

        /// Holds the next fetch of `url` until the returned sender fires
        pub fn gate(&self, url: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().insert(url.to_string(), rx);
            tx
        }
    }

    impl AssetFetcher for GatedFetcher {
        fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, LoadError>> {
            let gate = self.gates.lock().remove(url);
            let response = self.inner.fetch(url);
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                response.await
            }
            .boxed()
        }
    }
}
