//! Bucketing of images by instance key.

use std::collections::BTreeMap;

use super::parse_name;
use crate::types::Image;

/// One image inside a retention group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub ordering_key: String,
    pub image_id: String,
}

/// Instance key to the images seen for it, in listing order.
pub type RetentionGroups = BTreeMap<String, Vec<GroupEntry>>;

/// Group images by instance key.
///
/// Duplicate identifiers are not collapsed: an image listed twice counts
/// twice towards its group's size.
pub fn group_images<'a, I>(images: I) -> RetentionGroups
where
    I: IntoIterator<Item = &'a Image>,
{
    let mut groups = RetentionGroups::new();
    for image in images {
        let parsed = parse_name(&image.name);
        groups
            .entry(parsed.instance_key.to_string())
            .or_default()
            .push(GroupEntry {
                ordering_key: parsed.ordering_key.to_string(),
                image_id: image.id.clone(),
            });
    }
    groups
}
