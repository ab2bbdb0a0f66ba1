use crate::hub::TopicId;

/// Extract the post id from a subscription path.
///
/// Accepts `/comments/{post_id}`, optionally mounted under a prefix such as
/// `/api/v1/ws`. A trailing slash and a query string are ignored.
pub fn parse_topic(path: &str) -> Option<TopicId> {
    let path = path.split('?').next().unwrap_or_default();
    let mut segments = path.trim_end_matches('/').rsplit('/');

    let id = segments.next()?;
    if segments.next()? != "comments" {
        return None;
    }
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}
