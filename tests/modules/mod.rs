mod corpus;
#[cfg(feature = "serde_json-1")]
mod json;
mod usage;
