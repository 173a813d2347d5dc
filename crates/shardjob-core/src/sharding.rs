//! Sharding item parameter parsing.
//!
//! Parameters use the `index=value` list format, e.g. `0=Beijing,1=Shanghai`.
//! Every index must address a shard below the configured total.

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};

/// Parse a sharding item parameter string into an index → value map.
///
/// A blank string yields an empty map.
pub fn parse_sharding_parameter(input: &str, total: u32) -> CoreResult<BTreeMap<u32, String>> {
    let mut items = BTreeMap::new();
    if input.trim().is_empty() {
        return Ok(items);
    }

    let invalid = |reason: String| CoreError::InvalidShardingParameter {
        input: input.to_string(),
        reason,
    };

    for pair in input.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (index, value) = pair
            .split_once('=')
            .ok_or_else(|| invalid(format!("item '{pair}' is not in index=value form")))?;
        let index: u32 = index
            .trim()
            .parse()
            .map_err(|_| invalid(format!("index '{}' is not a number", index.trim())))?;
        if index >= total {
            return Err(invalid(format!(
                "index {index} is out of range for {total} shards"
            )));
        }
        if items.insert(index, value.trim().to_string()).is_some() {
            return Err(invalid(format!("index {index} appears more than once")));
        }
    }

    Ok(items)
}
