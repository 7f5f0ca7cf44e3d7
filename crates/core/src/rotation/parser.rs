//! Image name parsing.

/// Field separator in image names.
pub const NAME_SEPARATOR: char = '-';

/// Keys extracted from an image name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedName<'a> {
    /// First separator-delimited field.
    pub instance_key: &'a str,
    /// Last separator-delimited field.
    pub ordering_key: &'a str,
}

/// Split an image name into its instance key and ordering key.
///
/// Never fails. A name without a separator yields the whole name for
/// both keys, and empty leading or trailing fields are kept as empty keys.
pub fn parse_name(name: &str) -> ParsedName<'_> {
    let instance_key = name.split(NAME_SEPARATOR).next().unwrap_or(name);
    let ordering_key = name.rsplit(NAME_SEPARATOR).next().unwrap_or(name);
    ParsedName {
        instance_key,
        ordering_key,
    }
}
