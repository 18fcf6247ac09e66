use crate::post::Post;
use crate::store::SeenSetStore;
use std::collections::HashSet;

/// Posts from `posts` that still need a reply, in their original order.
///
/// Drops posts already in the seen-set, repeated ids after their first
/// occurrence, and posts without an id.
pub fn select_targets<'a>(posts: &'a [Post], seen: &SeenSetStore) -> Vec<&'a Post> {
    let mut emitted = HashSet::new();
    let mut targets = Vec::new();

    for post in posts {
        if post.id.is_empty() {
            tracing::warn!("Skipping post without id: {}", post.address);
            continue;
        }
        if seen.contains(&post.id) {
            continue;
        }
        if !emitted.insert(post.id.as_str()) {
            tracing::debug!(post_id = %post.id, "Ignoring repeated post in snapshot");
            continue;
        }
        targets.push(post);
    }

    tracing::debug!(
        "Selected {} of {} posts for reply",
        targets.len(),
        posts.len()
    );
    targets
}
