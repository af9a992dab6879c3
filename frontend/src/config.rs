pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Base URL of the task API, taken from `API_BASE_URL` at build time.
pub fn api_base_url() -> &'static str {
    resolve_base_url(option_env!("API_BASE_URL"))
}

fn resolve_base_url(configured: Option<&'static str>) -> &'static str {
    match configured.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => DEFAULT_API_BASE_URL,
    }
}

pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_blank_base_url_falls_back_to_local_default() {
        assert_eq!(resolve_base_url(None), DEFAULT_API_BASE_URL);
        assert_eq!(resolve_base_url(Some("  ")), DEFAULT_API_BASE_URL);
        assert_eq!(
            resolve_base_url(Some("https://tasks.example.com")),
            "https://tasks.example.com"
        );
    }

    #[test]
    fn endpoint_joins_without_doubled_slashes() {
        assert_eq!(
            endpoint("http://localhost:8080/", "/tasks"),
            "http://localhost:8080/tasks"
        );
        assert_eq!(
            endpoint("http://localhost:8080", "projects"),
            "http://localhost:8080/projects"
        );
    }
}
