//! Wire shape of `manifest.yaml`. Every field is optional here so that
//! missing fields are reported by path instead of by serde's generic message.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::locale::LocalizedText;
use crate::values::ConfigValue;

#[derive(Debug, Deserialize)]
pub(super) struct RawHeader {
    #[serde(rename = "apiVersion")]
    pub api_version: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawManifest {
    pub metadata: Option<RawMetadata>,
    pub spec: Option<RawSpec>,
    pub execution: Option<BTreeMap<String, Option<RawBinding>>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawMetadata {
    pub author: Option<String>,
    pub name: Option<String>,
    pub repository: Option<String>,
    pub version: Option<String>,
    pub description: Option<LocalizedText>,
    pub label: Option<LocalizedText>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawSpec {
    pub config: Option<Vec<RawOption>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawOption {
    pub name: Option<String>,
    pub label: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    #[serde(rename = "type")]
    pub option_type: Option<String>,
    pub required: Option<bool>,
    pub default: Option<ConfigValue>,
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawBinding {
    pub path: Option<String>,
    pub attr: Option<String>,
}
