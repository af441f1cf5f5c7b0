use super::*;

use comicdex_catalog::Additionals;

fn comic(code: &str) -> Comic {
    Comic {
        id: 1,
        code: code.to_string(),
        language_id: None,
        language_ietf: None,
        published_from: None,
        published_to: None,
        total_chapter: None,
        total_volume: None,
        nsfw: None,
        nsfl: None,
        additionals: Additionals::new(),
        titles: Vec::new(),
        covers: Vec::new(),
        synopses: Vec::new(),
        chapters: Vec::new(),
        externals: Vec::new(),
        categories: Vec::new(),
        tags: Vec::new(),
        relations: Vec::new(),
        created_at: chrono::Utc::now(),
        updated_at: None,
    }
}

#[test]
fn hit_until_cleared() {
    let cache = MemoryCache::new(Duration::from_secs(60));
    cache.put(comic("AAAAAAAA")).unwrap();
    assert_eq!(cache.get("AAAAAAAA").unwrap().unwrap().code, "AAAAAAAA");
    assert!(cache.get("BBBBBBBB").unwrap().is_none());

    cache.clear().unwrap();
    assert!(cache.is_empty());
}

#[test]
fn expired_entries_miss_and_are_swept() {
    let cache = MemoryCache::new(Duration::ZERO);
    cache.put(comic("AAAAAAAA")).unwrap();
    cache.put(comic("BBBBBBBB")).unwrap();
    assert!(cache.get("AAAAAAAA").unwrap().is_none());
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.sweep().unwrap(), 1);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn sweeper_runs_in_background() {
    let cache = Arc::new(MemoryCache::new(Duration::ZERO));
    cache.put(comic("AAAAAAAA")).unwrap();
    let handle = spawn_sweeper(cache.clone(), Duration::from_millis(10));
    for _ in 0..100 {
        if cache.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();
    assert!(cache.is_empty());
}
