//! Configuration types deserialized from `tessel.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The whole `tessel.toml` file.
#[derive(Debug, Default, Deserialize)]
pub struct TesselConfig {
    /// Import settings.
    #[serde(default)]
    pub import: ImportConfig,
}

/// Settings for one import run.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ImportConfig {
    /// Names of the top sub-circuits to import.
    ///
    /// Accepts either `top = "cpu"` or `top = ["cpu", "dma"]`.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub top: Vec<String>,
    /// Import every user sub-circuit whose name does not start with `$`.
    #[serde(default)]
    pub all: bool,
    /// Which lowering table is used for primitives and operators.
    #[serde(default)]
    pub mode: LoweringMode,
    /// Import unsupported primitives as black-box cells instead of failing.
    #[serde(default)]
    pub keep_going: bool,
    /// Run external-net hoisting on each top before importing.
    #[serde(default)]
    pub extnets: bool,
}

/// Selects the lowering table used by an import run.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoweringMode {
    /// Word-level cells, including the operator family.
    #[default]
    Cells,
    /// Single-bit gates only; operators are imported as sub-circuits.
    Gates,
}

fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut names = Vec::new();
            while let Some(name) = seq.next_element::<String>()? {
                names.push(name);
            }
            Ok(names)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
