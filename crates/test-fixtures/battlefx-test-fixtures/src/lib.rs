//! Named JSON fixtures shared by the battlefx test suites.
//!
//! `fixtures/manifest.json` maps fixture names to files under `fixtures/`, one
//! table per [`FixtureSet`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Result<Manifest, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .map_err(|err| err.to_string())
});

#[derive(Debug, Deserialize)]
struct Manifest {
    layouts: BTreeMap<String, String>,
    configs: BTreeMap<String, String>,
}

fn manifest() -> Result<&'static Manifest> {
    (*MANIFEST)
        .as_ref()
        .map_err(|err| anyhow!("fixtures manifest did not parse: {err}"))
}

/// Battle layouts: battler placement, palette banks and a random seed.
pub const LAYOUTS: FixtureSet = FixtureSet {
    kind: "layout",
    table: layout_table,
};

/// Engine sizing configurations.
pub const CONFIGS: FixtureSet = FixtureSet {
    kind: "config",
    table: config_table,
};

fn layout_table(m: &Manifest) -> &BTreeMap<String, String> {
    &m.layouts
}

fn config_table(m: &Manifest) -> &BTreeMap<String, String> {
    &m.configs
}

/// One table of the manifest.
#[derive(Clone, Copy)]
pub struct FixtureSet {
    kind: &'static str,
    table: fn(&Manifest) -> &BTreeMap<String, String>,
}

impl FixtureSet {
    /// Fixture names in sorted order.
    pub fn names(&self) -> Result<Vec<&'static str>> {
        Ok((self.table)(manifest()?).keys().map(String::as_str).collect())
    }

    pub fn get(&self, name: &str) -> Result<Fixture> {
        let rel = (self.table)(manifest()?)
            .get(name)
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.kind))?;
        Ok(Fixture {
            name: name.to_owned(),
            path: Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("../../../fixtures")
                .join(rel),
        })
    }

    /// Shorthand for `get(name)?.parse()`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.get(name)?.parse()
    }
}

/// A resolved fixture file.
#[derive(Clone, Debug)]
pub struct Fixture {
    name: String,
    path: PathBuf,
}

impl Fixture {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("reading fixture {} at {}", self.name, self.path.display()))
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.text()?)
            .with_context(|| format!("parsing fixture {} as JSON", self.name))
    }
}
