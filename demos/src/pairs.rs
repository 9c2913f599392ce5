//! Attribution/mask image pairs on disk.
//!
//! Expected layout:
//!
//! ```text
//! root/
//! ├── attributions/   grayscale attribution maps
//! └── masks/          ground-truth masks with the same file stems
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use burn::prelude::*;
use image::GenericImageView;
use walkdir::WalkDir;

use localisation::Batch;

const VALID_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One attribution map and its mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub attribution: PathBuf,
    pub mask: PathBuf,
}

impl ImagePair {
    pub fn name(&self) -> String {
        self.attribution
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn has_valid_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| VALID_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Finds every attribution map under `root/attributions` with a matching
/// mask under `root/masks`, sorted by path. Maps without a mask are skipped.
pub fn collect_pairs(root: &Path) -> Result<Vec<ImagePair>> {
    let attribution_root = root.join("attributions");
    let mask_root = root.join("masks");
    ensure!(
        attribution_root.is_dir(),
        "Attribution directory does not exist: {}",
        attribution_root.display()
    );
    ensure!(
        mask_root.is_dir(),
        "Mask directory does not exist: {}",
        mask_root.display()
    );

    let mut pairs = Vec::new();
    for entry in WalkDir::new(&attribution_root).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!("Failed to read directory entry in {}", attribution_root.display())
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !has_valid_extension(path) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let mask = VALID_EXTENSIONS
            .iter()
            .map(|ext| mask_root.join(format!("{stem}.{ext}")))
            .find(|candidate| candidate.is_file());
        match mask {
            Some(mask) => pairs.push(ImagePair {
                attribution: path.to_path_buf(),
                mask,
            }),
            None => tracing::warn!("No mask found for attribution: {}", path.display()),
        }
    }

    if pairs.is_empty() {
        bail!(
            "No valid attribution/mask pairs found in {}",
            attribution_root.display()
        );
    }
    tracing::info!(
        "Found {} attribution/mask pairs in {}",
        pairs.len(),
        root.display()
    );
    Ok(pairs)
}

/// Reads an image as single-channel luminance in `[0, 1]`.
fn load_luma(path: &Path) -> Result<(Vec<f32>, [usize; 2])> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image at {}", path.display()))?;
    let (width, height) = img.dimensions();
    let luma = img.to_luma32f();
    Ok((luma.into_raw(), [height as usize, width as usize]))
}

/// Loads `pairs` into a batch with attributions and masks.
///
/// The images themselves stand in for the inputs, since metrics only need
/// inputs for their shape when attributions are supplied. Every image must
/// share one size.
pub fn load_batch<B: Backend>(pairs: &[ImagePair], device: &B::Device) -> Result<Batch<B, 4>> {
    ensure!(!pairs.is_empty(), "No attribution/mask pairs to load");

    let mut size = None;
    let mut attributions = Vec::new();
    let mut masks = Vec::new();
    for pair in pairs {
        let (attribution, attribution_size) = load_luma(&pair.attribution)?;
        let (mask, mask_size) = load_luma(&pair.mask)?;
        ensure!(
            attribution_size == mask_size,
            "Size mismatch for {}: attribution {:?}, mask {:?}",
            pair.name(),
            attribution_size,
            mask_size
        );
        let expected = *size.get_or_insert(attribution_size);
        ensure!(
            attribution_size == expected,
            "Image {} has size {:?}, expected {:?}",
            pair.name(),
            attribution_size,
            expected
        );
        attributions.extend(attribution);
        masks.extend(mask);
    }

    let [height, width] = size.unwrap_or_default();
    let shape = [pairs.len(), 1, height, width];
    let attributions: Tensor<B, 4> =
        Tensor::from_data(TensorData::new(attributions, shape), device);
    let masks = Tensor::from_data(TensorData::new(masks, shape), device);
    let targets = Tensor::zeros([pairs.len()], device);

    Ok(Batch::new(attributions.clone(), targets)
        .with_attributions(attributions)
        .with_masks(masks))
}
