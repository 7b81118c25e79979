//! Object and verb vocabularies of the V-COCO dataset.

use crate::common::*;

/// Raw COCO category ids that appear in V-COCO, in dense label order.
pub const VALID_OBJECT_IDS: [i64; 80] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 27,
    28, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 46, 47, 48, 49, 50, 51, 52, 53,
    54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 65, 67, 70, 72, 73, 74, 75, 76, 77, 78, 79, 80,
    81, 82, 84, 85, 86, 87, 88, 89, 90,
];

/// Number of verb classes. Verb ids are already dense.
pub const NUM_VERBS: usize = 29;

/// The object label assigned to interactions without a target object.
pub const NO_OBJECT_LABEL: i64 = VALID_OBJECT_IDS.len() as i64;

/// The object id marking an interaction without a target object.
pub const NO_OBJECT_ID: i64 = -1;

/// Map a raw category id to its dense object label.
pub fn object_label(category_id: i64) -> Result<i64> {
    VALID_OBJECT_IDS
        .iter()
        .position(|&id| id == category_id)
        .map(|index| index as i64)
        .ok_or_else(|| format_err!("invalid object category id {}", category_id))
}

/// Map a raw verb id to its dense verb label.
pub fn verb_label(category_id: i64) -> Result<usize> {
    ensure!(
        (0..NUM_VERBS as i64).contains(&category_id),
        "invalid verb category id {}",
        category_id
    );
    Ok(category_id as usize)
}
