//! Snowflake parsing helpers.
//!
//! Users refer to other users by raw ID, by mention (`<@123…>`), or by the
//! display strings Herald itself produces (`ada (ID 123…)`). These helpers
//! recover the snowflake from any of those forms.

use regex::Regex;
use std::sync::LazyLock;

static SNOWFLAKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{16,20})$").expect("valid snowflake pattern"));
static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?(\d{16,20})>$").expect("valid mention pattern"));
static USER_DISPLAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*?\(?(\d{16,20})\)?$").expect("valid display pattern"));

/// Check if a string is a well-formed snowflake.
///
/// # Examples
///
/// ```
/// use herald_core::is_valid_snowflake;
///
/// assert!(is_valid_snowflake("1071782537564803163"));
/// assert!(!is_valid_snowflake("not-an-id"));
/// ```
pub fn is_valid_snowflake(snowflake: &str) -> bool {
    SNOWFLAKE.is_match(snowflake) && snowflake.parse::<u64>().is_ok()
}

/// Extract a snowflake from a raw ID, a user mention, or a display string.
///
/// # Examples
///
/// ```
/// use herald_core::snowflake_from_identifier;
///
/// assert_eq!(
///     snowflake_from_identifier("<@!902895279236333590>"),
///     Some(902895279236333590)
/// );
/// assert_eq!(snowflake_from_identifier("nobody"), None);
/// ```
pub fn snowflake_from_identifier(identifier: &str) -> Option<u64> {
    [&*SNOWFLAKE, &*USER_MENTION, &*USER_DISPLAY]
        .into_iter()
        .find_map(|pattern| pattern.captures(identifier))
        .and_then(|captures| captures.get(1))
        .and_then(|capture| capture.as_str().parse().ok())
}
