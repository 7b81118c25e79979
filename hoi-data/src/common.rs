pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use approx::{abs_diff_eq, assert_abs_diff_eq};
pub use bbox::{prelude::*, Transform as BoxTransform, HW, XYXY};
pub use indexmap::IndexMap;
pub use itertools::{izip, Itertools as _};
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng, seq::SliceRandom};
pub use serde::{Deserialize, Deserializer, Serialize, Serializer};
pub use slice_of_array::SliceFlatExt as _;
pub use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    iter,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Arc, Mutex},
};
pub use tch::{
    kind::{FLOAT_CPU, INT64_CPU},
    vision, Device, IndexOp, Kind, Tensor,
};
pub use tch_tensor_like::TensorLike;
pub use log::{debug, info, warn};

pub type ObjectLabel = label::Label<XYXY<f32>, i64>;
