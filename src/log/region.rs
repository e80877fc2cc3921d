//! Address to region classification
//!
//! The mapping is synthetic and only looks at the first octet:
//!
//! | first octet | region        |
//! |-------------|---------------|
//! | 1-49        | North America |
//! | 50-99       | Europe        |
//! | 100-149     | Asia          |
//! | 150-199     | Africa        |
//! | anything else, or unparseable | Other |

use super::types::Region;

/// Classify an address into a region. Never fails.
pub fn classify(address: &str) -> Region {
    let first_octet = match address.split('.').next().map(str::parse::<u64>) {
        Some(Ok(octet)) => octet,
        _ => return Region::Other,
    };

    match first_octet {
        1..=49 => Region::NorthAmerica,
        50..=99 => Region::Europe,
        100..=149 => Region::Asia,
        150..=199 => Region::Africa,
        _ => Region::Other,
    }
}
