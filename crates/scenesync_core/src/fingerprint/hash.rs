//! Perceptual hashing of scene stills.
//!
//! Uses the `image_hasher` crate. The hash is stored as raw bytes in a
//! `PerceptualHash` so the alignment engine never depends on the hasher.
//!
//! # Hash Algorithms
//!
//! - **AHash** (Average Hash): simplest, the default for scene stills
//! - **PHash** (Perceptual Hash): DCT-based, best across color grading
//! - **DHash** (Difference Hash): gradient-based, fast
//! - **BlockHash**: block-based, tolerant to partial changes

use std::path::{Path, PathBuf};

use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig};

use crate::models::{HashAlgorithm, PerceptualHash};
use crate::process::ExternalCommand;

fn hash_alg(algorithm: HashAlgorithm) -> HashAlg {
    match algorithm {
        HashAlgorithm::PHash => HashAlg::DoubleGradient,
        HashAlgorithm::DHash => HashAlg::Gradient,
        HashAlgorithm::AHash => HashAlg::Mean,
        HashAlgorithm::BlockHash => HashAlg::Blockhash,
    }
}

/// Create a hasher for many images with the same settings.
///
/// `hash_size` is the side length, so 8 gives a 64-bit hash.
pub fn create_hasher(algorithm: HashAlgorithm, hash_size: u8) -> Hasher {
    HasherConfig::new()
        .hash_alg(hash_alg(algorithm))
        .hash_size(u32::from(hash_size), u32::from(hash_size))
        .to_hasher()
}

/// Hash a decoded image.
pub fn hash_image(hasher: &Hasher, image: &DynamicImage) -> PerceptualHash {
    PerceptualHash::from_bytes(hasher.hash_image(image).as_bytes())
}

/// Hash an image file.
///
/// A missing or unreadable still is not fatal: the scene simply gets no
/// hash and cannot be matched.
pub fn hash_file(hasher: &Hasher, path: &Path) -> Option<PerceptualHash> {
    match image::open(path) {
        Ok(image) => Some(hash_image(hasher, &image)),
        Err(e) => {
            tracing::warn!("[Hash] no hash for {}: {}", path.display(), e);
            None
        }
    }
}

/// ImageMagick command that trims uniform borders from stills in place.
pub fn trim_borders_command(magick: &str, fuzz_pct: f64, images: &[PathBuf]) -> ExternalCommand {
    let mut cmd = ExternalCommand::new(magick).args([
        "mogrify".to_string(),
        "-fuzz".to_string(),
        format!("{}%", fuzz_pct),
        "-define".to_string(),
        "trim:percent-background=0%".to_string(),
        "-trim".to_string(),
        "+repage".to_string(),
        "-format".to_string(),
        "jpg".to_string(),
    ]);
    for image in images {
        cmd = cmd.path_arg(image);
    }
    cmd
}
