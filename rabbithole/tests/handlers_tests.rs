use rabbithole::handlers::*;
use rabbithole_core::SearchResult;

#[test]
fn test_normalize_url_arg_with_scheme() {
    let result = normalize_url_arg("https://example.com/article");
    assert_eq!(result, Some("https://example.com/article".to_string()));
}

#[test]
fn test_normalize_url_arg_without_scheme() {
    let result = normalize_url_arg("example.com/article");
    assert_eq!(result, Some("https://example.com/article".to_string()));
}

#[test]
fn test_normalize_url_arg_blank() {
    assert_eq!(normalize_url_arg(""), None);
    assert_eq!(normalize_url_arg("   "), None);
}

#[test]
fn test_format_result_line_basic() {
    let result = SearchResult::new("https://example.com/a", "Article A", 0.95);
    let line = format_result_line(0, &result);

    assert!(line.starts_with("1. Article A"));
    assert!(line.contains("https://example.com/a"));
    assert!(line.contains("score 0.95"));
}

#[test]
fn test_format_result_line_includes_metadata() {
    let mut result = SearchResult::new("https://example.com/b", "Article B", 0.8);
    result.published_date = Some("2024-04-15T00:00:00.000Z".to_string());
    result.author = Some("Jane Developer".to_string());

    let line = format_result_line(2, &result);
    assert!(line.starts_with("3. Article B"));
    assert!(line.contains("2024-04-15T00:00:00.000Z"));
    assert!(line.contains("Jane Developer"));
}

#[test]
fn test_results_to_json_wraps_in_results_key() {
    let results = vec![
        SearchResult::new("https://example.com/a", "Article A", 0.95),
        SearchResult::new("https://example.com/b", "Article B", 0.9),
    ];

    let json = results_to_json(&results);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let array = parsed["results"].as_array().unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array[0]["id"], "https://example.com/a");
    assert_eq!(array[1]["title"], "Article B");
    // Unset optional fields are omitted, not null.
    assert!(array[0].get("author").is_none());
}

#[test]
fn test_results_to_json_empty() {
    let json = results_to_json(&[]);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["results"].as_array().unwrap().len(), 0);
}
