//! News widgets: Hacker News, Reddit, and merged world headlines

use std::time::Duration;

use serde_json::{json, Value};

use crate::cache::ResponseCache;

const NEWS_TTL: Duration = Duration::from_secs(300);
const LIST_TIMEOUT: Duration = Duration::from_secs(5);
const ITEM_TIMEOUT: Duration = Duration::from_secs(3);

const HN_TOP_URL: &str = "https://hacker-news.firebaseio.com/v0/topstories.json";

fn hn_item_url(id: u64) -> String {
    format!("https://hacker-news.firebaseio.com/v0/item/{id}.json")
}

fn hn_comments_url(id: u64) -> String {
    format!("https://news.ycombinator.com/item?id={id}")
}

/// Top stories from Hacker News.
pub async fn hacker_news(
    client: &reqwest::Client,
    cache: &ResponseCache<Value>,
    limit: usize,
) -> Option<Value> {
    let client = client.clone();
    cache
        .get_or_fetch(&format!("hackernews_{limit}"), NEWS_TTL, || async move {
            let ids: Vec<u64> = client
                .get(HN_TOP_URL)
                .timeout(LIST_TIMEOUT)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let mut stories = Vec::new();
            for id in ids.into_iter().take(limit) {
                let Ok(resp) = client
                    .get(hn_item_url(id))
                    .timeout(ITEM_TIMEOUT)
                    .send()
                    .await
                else {
                    continue;
                };
                if !resp.status().is_success() {
                    continue;
                }
                let Ok(story) = resp.json::<Value>().await else {
                    continue;
                };
                stories.push(json!({
                    "title": story["title"].as_str().unwrap_or(""),
                    "url": story["url"].as_str().map(str::to_string)
                        .unwrap_or_else(|| hn_comments_url(id)),
                    "score": story["score"].as_i64().unwrap_or(0),
                    "comments": story["descendants"].as_i64().unwrap_or(0),
                    "hn_url": hn_comments_url(id),
                }));
            }
            Ok(Value::Array(stories))
        })
        .await
}

/// Hot posts from one subreddit, stickies excluded.
pub async fn reddit(
    client: &reqwest::Client,
    cache: &ResponseCache<Value>,
    subreddit: &str,
    limit: usize,
) -> Option<Value> {
    let client = client.clone();
    let subreddit = subreddit.to_string();
    cache
        .get_or_fetch(&format!("reddit_{subreddit}"), NEWS_TTL, || async move {
            let url = format!(
                "https://www.reddit.com/r/{subreddit}/hot.json?limit={}",
                limit + 5
            );
            let data: Value = client
                .get(&url)
                .timeout(LIST_TIMEOUT)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let posts: Vec<Value> = reddit_children(&data)
                .iter()
                .filter(|post| !post["stickied"].as_bool().unwrap_or(false))
                .take(limit)
                .map(|post| {
                    let created = post["created_utc"].as_f64().unwrap_or(0.0);
                    json!({
                        "title": truncate(post["title"].as_str().unwrap_or(""), 100),
                        "url": post["url"].as_str().unwrap_or(""),
                        "score": post["score"].as_i64().unwrap_or(0),
                        "comments": post["num_comments"].as_i64().unwrap_or(0),
                        "subreddit": post["subreddit"].as_str().unwrap_or(&subreddit),
                        "reddit_url": format!("https://reddit.com{}", post["permalink"].as_str().unwrap_or("")),
                        "time_ago": if created > 0.0 { time_ago(created) } else { String::new() },
                    })
                })
                .collect();
            Ok(Value::Array(posts))
        })
        .await
}

/// World headlines merged from Reddit r/worldnews (score > 1000) and
/// Hacker News (score > 100). Each source failure is tolerated; an empty
/// merge is reported as a fetch failure so stale headlines are served.
pub async fn headlines(
    client: &reqwest::Client,
    cache: &ResponseCache<Value>,
    limit: usize,
) -> Option<Value> {
    let client = client.clone();
    cache
        .get_or_fetch("headlines", NEWS_TTL, || async move {
            let mut headlines = Vec::new();

            match reddit_worldnews(&client).await {
                Ok(mut items) => headlines.append(&mut items),
                Err(err) => tracing::debug!(error = %err, "worldnews source unavailable"),
            }
            match hn_headlines(&client).await {
                Ok(mut items) => headlines.append(&mut items),
                Err(err) => tracing::debug!(error = %err, "hn headline source unavailable"),
            }

            if headlines.is_empty() {
                anyhow::bail!("no headline source available");
            }
            headlines.truncate(limit);
            Ok(Value::Array(headlines))
        })
        .await
}

async fn reddit_worldnews(client: &reqwest::Client) -> crate::error::Result<Vec<Value>> {
    let data: Value = client
        .get("https://www.reddit.com/r/worldnews/hot.json?limit=15")
        .timeout(LIST_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let items = reddit_children(&data)
        .iter()
        .filter(|post| {
            !post["stickied"].as_bool().unwrap_or(false)
                && post["score"].as_i64().unwrap_or(0) > 1000
        })
        .map(|post| {
            let url = match post["url"].as_str() {
                Some(u) if !u.is_empty() && !u.contains("reddit.com") => u.to_string(),
                _ => format!(
                    "https://reddit.com{}",
                    post["permalink"].as_str().unwrap_or("")
                ),
            };
            json!({
                "title": truncate(post["title"].as_str().unwrap_or(""), 120),
                "url": url,
                "source": "Reddit",
            })
        })
        .collect();
    Ok(items)
}

async fn hn_headlines(client: &reqwest::Client) -> crate::error::Result<Vec<Value>> {
    let ids: Vec<u64> = client
        .get(HN_TOP_URL)
        .timeout(LIST_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let mut items = Vec::new();
    for id in ids.into_iter().take(5) {
        let Ok(resp) = client
            .get(hn_item_url(id))
            .timeout(ITEM_TIMEOUT)
            .send()
            .await
        else {
            continue;
        };
        let Ok(story) = resp.json::<Value>().await else {
            continue;
        };
        if story["score"].as_i64().unwrap_or(0) > 100 {
            items.push(json!({
                "title": truncate(story["title"].as_str().unwrap_or(""), 120),
                "url": story["url"].as_str().map(str::to_string)
                    .unwrap_or_else(|| hn_comments_url(id)),
                "source": "HN",
            }));
        }
    }
    Ok(items)
}

fn reddit_children(data: &Value) -> Vec<Value> {
    data["data"]["children"]
        .as_array()
        .map(|children| {
            children
                .iter()
                .map(|item| item["data"].clone())
                .collect()
        })
        .unwrap_or_default()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Human-readable age of a Unix timestamp.
fn time_ago(timestamp: f64) -> String {
    let now = chrono::Utc::now().timestamp() as f64;
    let diff = (now - timestamp).max(0.0);
    if diff < 60.0 {
        "just now".to_string()
    } else if diff < 3600.0 {
        format!("{}m ago", (diff / 60.0) as i64)
    } else if diff < 86400.0 {
        format!("{}h ago", (diff / 3600.0) as i64)
    } else {
        format!("{}d ago", (diff / 86400.0) as i64)
    }
}
