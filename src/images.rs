//! Image localization: fetch remote images referenced by imported content
//! and rewrite their references to locally owned copies.
//!
//! Every `<img src>` in a record's content is resolved through
//! [`ImageLocalizer::fetch_and_cache`]: fetched into a temp file, validated
//! against its claimed format, handed to the host's media store, and
//! rewritten to the store's durable URL. References that cannot be
//! localized keep their original URL with [`FIXUP_MARKER`] appended, so a
//! later editorial pass can find them without the import failing.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use tracing::{debug, warn};
use url::Url;

use crate::html;
use crate::store::{ImageFetcher, MediaStore};
use crate::util::sanitize_file_name;

/// Suffix appended to an image reference that could not be localized.
pub const FIXUP_MARKER: &str = "#fixme";

/// Raster formats the importer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    /// Canonical file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
        }
    }

    /// Detect from a filename extension. `None` for anything that is not a
    /// supported raster extension.
    pub fn from_extension(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.')?.1;
        if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Some(ImageFormat::Jpeg)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(ImageFormat::Png)
        } else if ext.eq_ignore_ascii_case("gif") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    /// Detect from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
        {
            return Some(ImageFormat::Png);
        }
        if data.len() >= 3 && data[0] == 0x47 && data[1] == 0x49 && data[2] == 0x46 {
            return Some(ImageFormat::Gif);
        }
        None
    }
}

/// Check fetched bytes against the candidate filename.
///
/// Returns the filename to store under: unchanged when the extension
/// already matches the detected format, corrected once when it does not.
/// `None` means the bytes are not a supported raster image at all.
fn validate_image(data: &[u8], filename: &str) -> Option<String> {
    let format = ImageFormat::from_magic_bytes(data)?;

    if ImageFormat::from_extension(filename) == Some(format) {
        return Some(filename.to_string());
    }

    // one corrective rename: make the extension agree with the bytes
    let renamed = match filename.rfind('.') {
        Some(dot) => format!("{}.{}", &filename[..dot], format.extension()),
        None => format!("{}.{}", filename, format.extension()),
    };

    (ImageFormat::from_extension(&renamed) == Some(format)).then_some(renamed)
}

/// Rewrites remote image references to host-owned copies, fetching each
/// distinct URL at most once per commit operation.
///
/// The cache is owned by the localizer and lives exactly as long as one
/// commit pass; `None` entries record URLs that already failed, so repeated
/// references to a broken image do not retry the fetch.
pub struct ImageLocalizer<'a> {
    fetcher: &'a mut dyn ImageFetcher,
    media: &'a mut dyn MediaStore,
    cache: HashMap<String, Option<String>>,
}

impl<'a> ImageLocalizer<'a> {
    pub fn new(fetcher: &'a mut dyn ImageFetcher, media: &'a mut dyn MediaStore) -> Self {
        Self {
            fetcher,
            media,
            cache: HashMap::new(),
        }
    }

    /// Rewrite every `<img src>` in an HTML fragment.
    ///
    /// Localized references point at the media store; failed ones keep the
    /// original URL suffixed with [`FIXUP_MARKER`]. Returns the fragment's
    /// inner markup, without the document scaffolding fragment parsing
    /// introduces.
    pub fn localize(&mut self, content: &str) -> String {
        let dom = html::parse_fragment(content);

        for image in html::find_elements(&dom.document, "img") {
            let Some(src) = html::attribute(&image, "src") else {
                continue;
            };

            match self.fetch_and_cache(&src) {
                Some(local) => html::set_attribute(&image, "src", &local),
                None => html::set_attribute(&image, "src", &format!("{src}{FIXUP_MARKER}")),
            }
        }

        html::inner_markup(&dom)
    }

    /// Resolve one image reference to a host-owned URL, consulting and
    /// feeding the cache. `None` means the reference stays broken.
    pub fn fetch_and_cache(&mut self, src: &str) -> Option<String> {
        // only absolute URLs are candidates; anything else is left alone
        let url = match Url::parse(src) {
            Ok(url) if url.has_host() => url,
            _ => {
                debug!(src, "not an absolute URL, skipping fetch");
                return None;
            }
        };

        if let Some(cached) = self.cache.get(src) {
            return cached.clone();
        }

        let resolved = self.resolve(&url);
        self.cache.insert(src.to_string(), resolved.clone());
        resolved
    }

    fn resolve(&mut self, url: &Url) -> Option<String> {
        // basename of the URL path; the query string never reaches the name
        let basename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("");
        let decoded = percent_decode_str(basename).decode_utf8_lossy();
        let filename = sanitize_file_name(&decoded);

        // extension pre-check only; the bytes are validated after the fetch
        if ImageFormat::from_extension(&filename).is_none() {
            debug!(%url, %filename, "unsupported image extension");
            return None;
        }

        let temp = match self.fetcher.fetch(url) {
            Ok(temp) => temp,
            Err(err) => {
                debug!(%url, "image fetch failed: {err}");
                return None;
            }
        };

        let data = match std::fs::read(temp.path()) {
            Ok(data) => data,
            Err(err) => {
                warn!(%url, "could not read fetched image: {err}");
                return None;
            }
        };

        let Some(filename) = validate_image(&data, &filename) else {
            debug!(%url, "fetched bytes are not a usable image");
            return None;
        };

        let media_id = match self.media.store_uploaded_file(temp.path(), &filename) {
            Ok(id) => id,
            Err(err) => {
                warn!(%url, %filename, "media store rejected image: {err}");
                return None;
            }
        };

        // temp file is dropped (and deleted) on every path out of here
        self.media
            .public_url(media_id)
            .filter(|public| !public.is_empty())
    }
}
