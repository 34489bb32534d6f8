use std::fs;
use std::path::Path;

use rust_embed::Embed;

use crate::descriptor::document::Document;
use crate::error::{FormError, Result};

#[derive(Embed)]
#[folder = "assets/"]
struct DescriptorAssets;

pub const BUNDLED_DESCRIPTOR: &str = "cell_descriptors.json";

impl Document {
    /// Loads the sample descriptor compiled into the binary.
    pub fn load_bundled(titles: &[String]) -> Result<Self> {
        let file = DescriptorAssets::get(BUNDLED_DESCRIPTOR).ok_or_else(|| {
            FormError::malformed(format!("bundled descriptor {BUNDLED_DESCRIPTOR} is missing"))
        })?;
        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|e| FormError::malformed(format!("{BUNDLED_DESCRIPTOR}: {e}")))?;
        Self::load_with_titles(content, titles)
    }

    /// Loads a descriptor file from disk. Read failures count as malformed
    /// configuration: either way there is no form to show.
    pub fn load_path(path: &Path, titles: &[String]) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| FormError::malformed(format!("{}: {e}", path.display())))?;
        Self::load_with_titles(&content, titles).map_err(|e| match e {
            FormError::MalformedConfig(msg) => {
                FormError::malformed(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }
}
