use super::support::{Call, ScriptedClient};
use flowdeploy::cache::{ParameterContextCache, PathCache};
use flowdeploy::path::{ContainerNode, ProcessGroupListing};

fn listing() -> Vec<ProcessGroupListing> {
    vec![ProcessGroupListing {
        id: "ou".to_string(),
        name: "ou1".to_string(),
        parent_group_id: Some("base".to_string()),
        // deepest-first, as some remotes report it
        path: vec![
            ContainerNode {
                id: "base".to_string(),
                name: "From DC1".to_string(),
                parent_id: Some("root".to_string()),
            },
            ContainerNode {
                id: "root".to_string(),
                name: "NiFi Flow".to_string(),
                parent_id: None,
            },
        ],
    }]
}

#[tokio::test]
async fn path_cache_fetches_once_and_normalizes() {
    let client = ScriptedClient::new().with_listing("nifi-1", listing());
    let cache = PathCache::new();

    let first = cache.get_or_fetch("nifi-1", &client).await.unwrap();
    assert_eq!(first[0].segments, vec!["NiFi Flow", "From DC1", "ou1"]);
    let second = cache.get_or_fetch("nifi-1", &client).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(client.count(|c| matches!(c, Call::ListGroups(_))), 1);

    cache.invalidate("nifi-1");
    assert!(cache.get("nifi-1").is_none());
    cache.get_or_fetch("nifi-1", &client).await.unwrap();
    assert_eq!(client.count(|c| matches!(c, Call::ListGroups(_))), 2);
}

#[tokio::test]
async fn failed_fetch_caches_nothing() {
    let client = ScriptedClient::new();
    let cache = PathCache::new();
    let error = cache.get_or_fetch("nifi-9", &client).await.unwrap_err();
    assert_eq!(error.status, Some(404));
    assert!(cache.get("nifi-9").is_none());
}

#[tokio::test]
async fn invalidate_all_clears_every_instance() {
    let cache = PathCache::new();
    cache.insert("a", Vec::new());
    cache.insert("b", Vec::new());
    cache.invalidate_all();
    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_none());
}

#[tokio::test]
async fn parameter_contexts_are_cached_per_instance() {
    let client = ScriptedClient::new()
        .with_contexts("nifi-1", &["dc1-params"])
        .with_contexts("nifi-2", &["dc2-params"]);
    let cache = ParameterContextCache::new();

    let one = cache.get_or_fetch("nifi-1", &client).await.unwrap();
    let two = cache.get_or_fetch("nifi-2", &client).await.unwrap();
    assert_eq!(one.as_slice(), ["dc1-params".to_string()]);
    assert_eq!(two.as_slice(), ["dc2-params".to_string()]);
    cache.get_or_fetch("nifi-1", &client).await.unwrap();
    assert_eq!(client.count(|c| matches!(c, Call::ListContexts(_))), 2);

    cache.invalidate("nifi-1");
    cache.get_or_fetch("nifi-1", &client).await.unwrap();
    assert_eq!(client.count(|c| matches!(c, Call::ListContexts(_))), 3);
}
