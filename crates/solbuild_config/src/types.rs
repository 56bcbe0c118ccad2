//! Configuration types deserialized from `solbuild.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Default directory holding source units, relative to the project root.
pub const DEFAULT_SOURCE_DIR: &str = "contracts";

/// Default directory receiving artifacts, relative to the project root.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Default directory caching downloaded compiler binaries.
pub const DEFAULT_CACHE_DIR: &str = ".solbuild/compilers";

/// Default remote location of compiler builds.
pub const DEFAULT_BINARIES_URL: &str = "https://binaries.soliditylang.org/linux-amd64/";

/// Default timeout for a compiler binary download, in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT: u64 = 120;

/// The top-level project configuration parsed from `solbuild.toml`.
///
/// Every section is optional; a project without a configuration file
/// builds with [`ProjectConfig::default`].
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    /// Project layout and unit selection.
    #[serde(default)]
    pub project: ProjectMeta,
    /// Compiler selection, download and settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Project layout and unit selection.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name, used in status output.
    #[serde(default)]
    pub name: Option<String>,
    /// Directory holding the source units.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    /// Directory receiving one JSON artifact per unit.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,
    /// Units to build. Empty (or `"*"`) means every discovered unit.
    ///
    /// Accepts either a single string or a list of strings.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub units: Vec<String>,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            name: None,
            source_dir: default_source_dir(),
            artifacts_dir: default_artifacts_dir(),
            units: Vec::new(),
        }
    }
}

/// Compiler selection, download and settings.
#[derive(Debug, Deserialize)]
pub struct CompilerConfig {
    /// Version override. When set, every unit compiles with this version
    /// regardless of its declared range.
    #[serde(default)]
    pub version: Option<String>,
    /// Base URL the compiler build identifiers are appended to.
    #[serde(default = "default_binaries_url")]
    pub binaries_url: String,
    /// Directory caching downloaded compiler binaries.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Download timeout in seconds.
    #[serde(default = "default_download_timeout")]
    pub download_timeout: u64,
    /// Compiler settings object passed verbatim in every request.
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
    /// Extra catalog entries: version → build identifier.
    #[serde(default)]
    pub catalog: BTreeMap<String, String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            version: None,
            binaries_url: default_binaries_url(),
            cache_dir: default_cache_dir(),
            download_timeout: default_download_timeout(),
            settings: None,
            catalog: BTreeMap::new(),
        }
    }
}

fn default_source_dir() -> String {
    DEFAULT_SOURCE_DIR.to_string()
}

fn default_artifacts_dir() -> String {
    DEFAULT_ARTIFACTS_DIR.to_string()
}

fn default_cache_dir() -> String {
    DEFAULT_CACHE_DIR.to_string()
}

fn default_binaries_url() -> String {
    DEFAULT_BINARIES_URL.to_string()
}

fn default_download_timeout() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows TOML config to accept both `units = "Token"` (string) and
/// `units = ["Token", "Exchange"]` (array of strings).
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

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
