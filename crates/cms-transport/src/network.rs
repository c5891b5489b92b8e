use cms_pages_types::env_utils::env_nonempty;

const CONTENTFUL_GRAPHQL_HOST: &str = "https://graphql.contentful.com";
const DEFAULT_ENVIRONMENT: &str = "master";

/// Endpoint for a space/environment pair on the public GraphQL host.
pub fn default_graphql_endpoint(space_id: &str, environment: &str) -> String {
    let environment = if environment.trim().is_empty() {
        DEFAULT_ENVIRONMENT
    } else {
        environment.trim()
    };
    format!(
        "{}/content/v1/spaces/{}/environments/{}",
        CONTENTFUL_GRAPHQL_HOST,
        space_id.trim(),
        environment
    )
}

/// Endpoint to use, honouring `CONTENTFUL_GRAPHQL_ENDPOINT` when set.
pub fn resolve_graphql_endpoint(space_id: &str, environment: &str) -> String {
    if let Some(value) = env_nonempty("CONTENTFUL_GRAPHQL_ENDPOINT") {
        return value;
    }
    default_graphql_endpoint(space_id, environment)
}

/// Pull the environment name out of an endpoint URL, if it has one.
pub fn infer_environment_from_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/environments/")?;
    let env = rest.split(['/', '?']).next()?;
    (!env.is_empty()).then_some(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        assert_eq!(
            default_graphql_endpoint("abc123", "staging"),
            "https://graphql.contentful.com/content/v1/spaces/abc123/environments/staging"
        );
    }

    #[test]
    fn test_blank_environment_means_master() {
        assert!(default_graphql_endpoint("abc123", " ").ends_with("/environments/master"));
    }

    #[test]
    fn test_infer_environment() {
        let url = default_graphql_endpoint("s", "preview-2");
        assert_eq!(infer_environment_from_url(&url), Some("preview-2"));
        assert_eq!(
            infer_environment_from_url("https://x/environments/dev?locale=en"),
            Some("dev")
        );
        assert_eq!(infer_environment_from_url("https://localhost:4000/graphql"), None);
    }
}
