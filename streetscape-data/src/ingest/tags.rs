//! Tag collection for ingested elements.
use streetscape_core::Tags;

pub(super) fn collect_tags<'a, T>(tags: T) -> Tags
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    tags.into_iter().collect()
}
