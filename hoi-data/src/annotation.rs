//! The annotation file format.

use crate::{common::*, vocab::NO_OBJECT_ID};

/// Annotations of a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotation {
    pub file_name: String,
    /// Objects in the image. HOI entries refer to them by position.
    pub annotations: Vec<ObjectAnnotation>,
    #[serde(default)]
    pub hoi_annotation: Vec<HoiAnnotation>,
}

/// A labeled object box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAnnotation {
    /// Box corners `[x1, y1, x2, y2]` in pixels.
    pub bbox: [f32; 4],
    pub category_id: i64,
}

/// A subject-object-verb interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HoiAnnotation {
    pub subject_id: i64,
    /// The object position, or `-1` if the verb has no object.
    pub object_id: i64,
    pub category_id: i64,
}

impl HoiAnnotation {
    pub fn has_object(&self) -> bool {
        self.object_id != NO_OBJECT_ID
    }
}

impl ImageAnnotation {
    /// True if the image has no interaction with a target object.
    pub fn is_hoi_free(&self) -> bool {
        self.hoi_annotation.iter().all(|hoi| !hoi.has_object())
    }
}

/// Load the list of image annotations from a JSON file.
pub fn load_annotations(path: impl AsRef<Path>) -> Result<Vec<ImageAnnotation>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read annotation file '{}'", path.display()))?;
    let annotations: Vec<ImageAnnotation> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse annotation file '{}'", path.display()))?;
    Ok(annotations)
}

/// Parse the numeric image id from file names like `COCO_val2014_000000000042.jpg`.
pub fn parse_image_id(file_name: &str) -> Result<i64> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| format_err!("invalid image file name '{}'", file_name))?;
    let field = stem
        .split('_')
        .nth(2)
        .ok_or_else(|| format_err!("image file name '{}' has no id field", file_name))?;
    let id = field
        .parse()
        .with_context(|| format!("invalid image id in file name '{}'", file_name))?;
    Ok(id)
}
